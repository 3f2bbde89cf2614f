//! Attachment blobs on the local filesystem, addressed by paths relative to the
//! media root (`attachments/<uuid>_<name>`).

use std::io;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

const ATTACHMENT_DIR: &str = "attachments";

#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        BlobStore { root: root.into() }
    }

    /// Writes `bytes` under a fresh name and returns its relative path.
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> io::Result<String> {
        let relative = format!(
            "{}/{}_{}",
            ATTACHMENT_DIR,
            Uuid::new_v4(),
            sanitize_file_name(original_name)
        );
        let absolute = self.root.join(&relative);
        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&absolute, bytes).await?;
        Ok(relative)
    }

    pub async fn read(&self, relative: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.resolve(relative)?).await
    }

    /// Removes a blob. A blob that is already gone counts as removed.
    pub async fn delete(&self, relative: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.resolve(relative)?).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Best-effort removal of blobs whose rows were already deleted.
    pub async fn release(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.delete(path).await {
                log::warn!("could not remove blob {}: {}", path, e);
            }
        }
    }

    /// Passes `result` through, releasing `paths` first when it is an error.
    pub async fn release_on_err<T, E>(&self, result: Result<T, E>, paths: &[String]) -> Result<T, E> {
        if result.is_err() {
            self.release(paths).await;
        }
        result
    }

    fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let path = Path::new(relative);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || relative.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid blob path `{}`", relative),
            ));
        }
        Ok(self.root.join(path))
    }
}

/// Keeps the last path segment and replaces anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.chars().take(100).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_file_name(".."), "file");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[actix_rt::test]
    async fn test_store_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let path = store.store("notes.txt", b"hello").await.unwrap();
        assert!(path.starts_with("attachments/"));
        assert!(path.ends_with("_notes.txt"));
        assert_eq!(store.read(&path).await.unwrap(), b"hello");

        store.delete(&path).await.unwrap();
        assert!(store.read(&path).await.is_err());
        // Deleting twice is fine.
        store.delete(&path).await.unwrap();
    }

    #[actix_rt::test]
    async fn test_release_on_err_keeps_blob_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let kept = store.store("kept.txt", b"a").await.unwrap();
        let ok: Result<i32, &str> = store.release_on_err(Ok(1), &[kept.clone()]).await;
        assert_eq!(ok, Ok(1));
        assert_eq!(store.read(&kept).await.unwrap(), b"a");

        let dropped = store.store("dropped.txt", b"b").await.unwrap();
        let err: Result<i32, &str> = store
            .release_on_err(Err("commit failed"), &[dropped.clone()])
            .await;
        assert_eq!(err, Err("commit failed"));
        assert!(store.read(&dropped).await.is_err());
    }

    #[actix_rt::test]
    async fn test_rejects_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path());

        let err = store.read("../secret").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(store.delete("/etc/passwd").await.is_err());
    }
}
