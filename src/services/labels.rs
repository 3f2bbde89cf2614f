use sqlx::PgConnection;

use super::error::{BoardError, BoardResult};
use super::guard::{self, Scope};
use crate::models::label::{DEFAULT_LABEL_COLOR, DEFAULT_LABEL_TEXT_COLOR};
use crate::models::{Label, LabelInput, LabelUpdate, Role, UserIdentity};

const LABEL_COLUMNS: &str = "id, board_id, name, color, text_color";

pub async fn list_labels(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
) -> BoardResult<Vec<Label>> {
    guard::authorize(conn, actor, board_id, Role::ANY).await?;
    let labels = sqlx::query_as::<_, Label>(&format!(
        "SELECT {} FROM labels WHERE board_id = $1 ORDER BY name, id",
        LABEL_COLUMNS
    ))
    .bind(board_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(labels)
}

pub async fn create_label(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
    input: LabelInput,
) -> BoardResult<Label> {
    guard::authorize(conn, actor, board_id, Role::ANY).await?;
    let label = sqlx::query_as::<_, Label>(&format!(
        "INSERT INTO labels (board_id, name, color, text_color) VALUES ($1, $2, $3, $4)
         RETURNING {}",
        LABEL_COLUMNS
    ))
    .bind(board_id)
    .bind(input.name)
    .bind(input.color.unwrap_or_else(|| DEFAULT_LABEL_COLOR.to_string()))
    .bind(input.text_color.unwrap_or_else(|| DEFAULT_LABEL_TEXT_COLOR.to_string()))
    .fetch_one(&mut *conn)
    .await?;
    Ok(label)
}

pub async fn update_label(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    label_id: i32,
    input: LabelUpdate,
) -> BoardResult<Label> {
    guard::authorize_in(conn, actor, Scope::Label(label_id), Role::ANY).await?;
    sqlx::query_as::<_, Label>(&format!(
        "UPDATE labels SET
            name = COALESCE($2, name),
            color = COALESCE($3, color),
            text_color = COALESCE($4, text_color)
         WHERE id = $1
         RETURNING {}",
        LABEL_COLUMNS
    ))
    .bind(label_id)
    .bind(input.name)
    .bind(input.color)
    .bind(input.text_color)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(BoardError::NotFound("Label"))
}

/// Deletes a label; cards carrying it lose it by cascade.
pub async fn delete_label(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    label_id: i32,
) -> BoardResult<()> {
    guard::authorize_in(conn, actor, Scope::Label(label_id), Role::ANY).await?;
    sqlx::query("DELETE FROM labels WHERE id = $1")
        .bind(label_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
