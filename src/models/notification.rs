use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Why a notification was sent. Corresponds to the `notification_kind` SQL enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The user's handle appeared in a comment or card description.
    Mention,
    /// The user was added to a card's assignees.
    CardAssigned,
    /// The user was added to a board.
    MemberAdded,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub kind: NotificationKind,
    pub message: String,
    pub board_id: Option<i32>,
    pub card_id: Option<i32>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification about to be written by the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: i32,
    pub kind: NotificationKind,
    pub message: String,
    pub board_id: Option<i32>,
    pub card_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// Only return notifications not yet marked read.
    #[serde(default)]
    pub unread: bool,
}
