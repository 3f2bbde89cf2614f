use sqlx::PgConnection;

use super::error::{BoardError, BoardResult};
use super::guard::{self, Scope};
use crate::models::{List, ListInput, ListUpdate, Role, UserIdentity};

const LIST_COLUMNS: &str = r#"id, board_id, title, "order", created_at"#;

/// Lists of a board ordered by `(order, id)`.
pub async fn list_lists(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
) -> BoardResult<Vec<List>> {
    guard::authorize(conn, actor, board_id, Role::ANY).await?;
    let lists = sqlx::query_as::<_, List>(&format!(
        r#"SELECT {} FROM lists WHERE board_id = $1 ORDER BY "order", id"#,
        LIST_COLUMNS
    ))
    .bind(board_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(lists)
}

pub async fn create_list(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
    input: ListInput,
) -> BoardResult<List> {
    guard::authorize(conn, actor, board_id, Role::ANY).await?;
    let list = sqlx::query_as::<_, List>(&format!(
        r#"INSERT INTO lists (board_id, title, "order") VALUES ($1, $2, $3) RETURNING {}"#,
        LIST_COLUMNS
    ))
    .bind(board_id)
    .bind(input.title)
    .bind(input.order.unwrap_or(0))
    .fetch_one(&mut *conn)
    .await?;
    Ok(list)
}

pub async fn update_list(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    list_id: i32,
    input: ListUpdate,
) -> BoardResult<List> {
    guard::authorize_in(conn, actor, Scope::List(list_id), Role::ANY).await?;
    sqlx::query_as::<_, List>(&format!(
        r#"UPDATE lists SET
              title = COALESCE($2, title),
              "order" = COALESCE($3, "order")
           WHERE id = $1
           RETURNING {}"#,
        LIST_COLUMNS
    ))
    .bind(list_id)
    .bind(input.title)
    .bind(input.order)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(BoardError::NotFound("List"))
}

/// Deletes a list with its cards. Returns blob paths to release after commit.
pub async fn delete_list(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    list_id: i32,
) -> BoardResult<Vec<String>> {
    guard::authorize_in(conn, actor, Scope::List(list_id), Role::ANY).await?;

    let blob_paths: Vec<String> = sqlx::query_scalar(
        "SELECT a.file_path FROM attachments a
         JOIN cards c ON c.id = a.card_id
         WHERE c.list_id = $1",
    )
    .bind(list_id)
    .fetch_all(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM lists WHERE id = $1")
        .bind(list_id)
        .execute(&mut *conn)
        .await?;
    Ok(blob_paths)
}
