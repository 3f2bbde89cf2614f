//! Card attachments: metadata rows in the database, bytes in the [`BlobStore`].

use sqlx::PgConnection;

use super::error::{BoardError, BoardResult};
use super::guard::{self, Scope};
use crate::models::{Attachment, Role, UserIdentity};
use crate::storage::BlobStore;

const ATTACHMENT_COLUMNS: &str =
    "id, card_id, uploaded_by, file_name, file_path, size_bytes, created_at";

pub async fn list_attachments(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    card_id: i32,
) -> BoardResult<Vec<Attachment>> {
    guard::authorize_in(conn, actor, Scope::Card(card_id), Role::ANY).await?;
    let attachments = sqlx::query_as::<_, Attachment>(&format!(
        "SELECT {} FROM attachments WHERE card_id = $1 ORDER BY created_at, id",
        ATTACHMENT_COLUMNS
    ))
    .bind(card_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(attachments)
}

/// Stores the bytes and records them against the card. If the row cannot be
/// written the blob is removed again.
pub async fn upload_attachment(
    conn: &mut PgConnection,
    store: &BlobStore,
    actor: &UserIdentity,
    card_id: i32,
    file_name: &str,
    bytes: &[u8],
) -> BoardResult<Attachment> {
    guard::authorize_in(conn, actor, Scope::Card(card_id), Role::ANY).await?;
    if bytes.is_empty() {
        return Err(BoardError::invalid_field(
            "file",
            "empty",
            "Attachments cannot be empty",
        ));
    }

    let file_path = store.store(file_name, bytes).await?;
    let inserted = sqlx::query_as::<_, Attachment>(&format!(
        "INSERT INTO attachments (card_id, uploaded_by, file_name, file_path, size_bytes)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        ATTACHMENT_COLUMNS
    ))
    .bind(card_id)
    .bind(actor.id)
    .bind(file_name)
    .bind(&file_path)
    .bind(bytes.len() as i64)
    .fetch_one(&mut *conn)
    .await;

    Ok(store.release_on_err(inserted, &[file_path]).await?)
}

/// The attachment row and its bytes.
pub async fn download_attachment(
    conn: &mut PgConnection,
    store: &BlobStore,
    actor: &UserIdentity,
    attachment_id: i32,
) -> BoardResult<(Attachment, Vec<u8>)> {
    guard::authorize_in(conn, actor, Scope::Attachment(attachment_id), Role::ANY).await?;
    let attachment = find_attachment(conn, attachment_id).await?;
    let bytes = store.read(&attachment.file_path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            log::warn!("blob missing for attachment {}", attachment_id);
            BoardError::NotFound("Attachment")
        } else {
            BoardError::Blob(e)
        }
    })?;
    Ok((attachment, bytes))
}

/// Only the uploader may delete. Returns the blob path to release after commit.
pub async fn delete_attachment(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    attachment_id: i32,
) -> BoardResult<String> {
    guard::authorize_in(conn, actor, Scope::Attachment(attachment_id), Role::ANY).await?;
    let attachment = find_attachment(conn, attachment_id).await?;
    if attachment.uploaded_by != actor.id {
        return Err(BoardError::Forbidden);
    }

    sqlx::query("DELETE FROM attachments WHERE id = $1")
        .bind(attachment_id)
        .execute(&mut *conn)
        .await?;
    Ok(attachment.file_path)
}

async fn find_attachment(conn: &mut PgConnection, attachment_id: i32) -> BoardResult<Attachment> {
    sqlx::query_as::<_, Attachment>(&format!(
        "SELECT {} FROM attachments WHERE id = $1",
        ATTACHMENT_COLUMNS
    ))
    .bind(attachment_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(BoardError::NotFound("Attachment"))
}
