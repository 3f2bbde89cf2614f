use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A file attached to a card. The blob itself lives in the blob store under
/// `file_path`, which is never exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    pub id: i32,
    pub card_id: i32,
    pub uploaded_by: i32,
    pub file_name: String,
    #[serde(skip_serializing, default)]
    pub file_path: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Query string of a raw-body upload: `?filename=report.pdf`.
#[derive(Debug, Deserialize, Validate)]
pub struct UploadQuery {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
}
