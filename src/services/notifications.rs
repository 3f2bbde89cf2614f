//! A user's own notification feed. Other users' notifications are reported as
//! missing rather than forbidden.

use sqlx::PgConnection;

use super::error::{BoardError, BoardResult};
use crate::models::{Notification, UserIdentity};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, message, board_id, card_id, is_read, created_at";

/// Newest first; `unread_only` hides read entries.
pub async fn list_notifications(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    unread_only: bool,
) -> BoardResult<Vec<Notification>> {
    let notifications = sqlx::query_as::<_, Notification>(&format!(
        "SELECT {} FROM notifications
         WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
         ORDER BY created_at DESC, id DESC",
        NOTIFICATION_COLUMNS
    ))
    .bind(actor.id)
    .bind(unread_only)
    .fetch_all(&mut *conn)
    .await?;
    Ok(notifications)
}

pub async fn mark_read(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    notification_id: i32,
) -> BoardResult<Notification> {
    sqlx::query_as::<_, Notification>(&format!(
        "UPDATE notifications SET is_read = TRUE
         WHERE id = $1 AND user_id = $2
         RETURNING {}",
        NOTIFICATION_COLUMNS
    ))
    .bind(notification_id)
    .bind(actor.id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(BoardError::NotFound("Notification"))
}

/// Marks every unread notification of the actor as read. Returns how many changed.
pub async fn mark_all_read(conn: &mut PgConnection, actor: &UserIdentity) -> BoardResult<u64> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
            .bind(actor.id)
            .execute(&mut *conn)
            .await?;
    Ok(result.rows_affected())
}

pub async fn delete_notification(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    notification_id: i32,
) -> BoardResult<()> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
        .bind(notification_id)
        .bind(actor.id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(BoardError::NotFound("Notification"));
    }
    Ok(())
}
