//! Board aggregate: creation with owner bootstrap, the board page read model, and
//! cascading deletion.

use sqlx::PgConnection;
use std::collections::HashMap;

use super::error::{BoardError, BoardResult};
use super::guard;
use super::{cards, membership};
use crate::models::board::{DEFAULT_BOARD_COLOR, DEFAULT_BOARD_ICON};
use crate::models::{
    Board, BoardDetail, BoardInput, BoardUpdate, Card, List, ListWithCards, Role, UserIdentity,
};

const BOARD_COLUMNS: &str = "id, title, description, color, icon, created_by, created_at";

/// Boards the actor is a member of, newest first.
pub async fn list_boards(conn: &mut PgConnection, actor: &UserIdentity) -> BoardResult<Vec<Board>> {
    let boards = sqlx::query_as::<_, Board>(
        "SELECT b.id, b.title, b.description, b.color, b.icon, b.created_by, b.created_at
         FROM boards b
         JOIN board_memberships m ON m.board_id = b.id
         WHERE m.user_id = $1
         ORDER BY b.created_at DESC, b.id DESC",
    )
    .bind(actor.id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(boards)
}

/// Creates a board and makes the actor its owner, on the same connection.
pub async fn create_board(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    input: BoardInput,
) -> BoardResult<Board> {
    let board = sqlx::query_as::<_, Board>(&format!(
        "INSERT INTO boards (title, description, color, icon, created_by)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        BOARD_COLUMNS
    ))
    .bind(input.title)
    .bind(input.description.unwrap_or_default())
    .bind(input.color.unwrap_or_else(|| DEFAULT_BOARD_COLOR.to_string()))
    .bind(input.icon.unwrap_or_else(|| DEFAULT_BOARD_ICON.to_string()))
    .bind(actor.id)
    .fetch_one(&mut *conn)
    .await?;

    membership::create_board_ownership(conn, board.id, actor.id).await?;
    log::info!("user {} created board {}", actor.id, board.id);
    Ok(board)
}

pub async fn get_board(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
) -> BoardResult<BoardDetail> {
    guard::authorize(conn, actor, board_id, Role::ANY).await?;
    let board = find_board(conn, board_id).await?;

    let lists = sqlx::query_as::<_, List>(
        r#"SELECT id, board_id, title, "order", created_at
           FROM lists WHERE board_id = $1
           ORDER BY "order", id"#,
    )
    .bind(board_id)
    .fetch_all(&mut *conn)
    .await?;

    // Cards arrive already sorted by (order, id); grouping keeps that order.
    let mut by_list: HashMap<i32, Vec<Card>> = HashMap::new();
    for card in cards::cards_of_board(conn, board_id).await? {
        by_list.entry(card.list_id).or_default().push(card);
    }
    let lists = lists
        .into_iter()
        .map(|list| {
            let cards = by_list.remove(&list.id).unwrap_or_default();
            ListWithCards { list, cards }
        })
        .collect();

    let memberships = membership::members_of(conn, board_id).await?;
    Ok(BoardDetail {
        board,
        lists,
        memberships,
    })
}

pub async fn update_board(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
    input: BoardUpdate,
) -> BoardResult<Board> {
    guard::authorize(conn, actor, board_id, Role::ANY).await?;
    sqlx::query_as::<_, Board>(&format!(
        "UPDATE boards SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            color = COALESCE($4, color),
            icon = COALESCE($5, icon)
         WHERE id = $1
         RETURNING {}",
        BOARD_COLUMNS
    ))
    .bind(board_id)
    .bind(input.title)
    .bind(input.description)
    .bind(input.color)
    .bind(input.icon)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(BoardError::NotFound("Board"))
}

/// Deletes the board and, by cascade, everything it owns. Returns the blob paths of
/// the attachments that went with it; the caller releases them after commit.
pub async fn delete_board(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
) -> BoardResult<Vec<String>> {
    guard::authorize(conn, actor, board_id, Role::ANY).await?;

    let blob_paths: Vec<String> = sqlx::query_scalar(
        "SELECT a.file_path FROM attachments a
         JOIN cards c ON c.id = a.card_id
         JOIN lists l ON l.id = c.list_id
         WHERE l.board_id = $1",
    )
    .bind(board_id)
    .fetch_all(&mut *conn)
    .await?;

    let result = sqlx::query("DELETE FROM boards WHERE id = $1")
        .bind(board_id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(BoardError::NotFound("Board"));
    }

    log::info!("user {} deleted board {}", actor.id, board_id);
    Ok(blob_paths)
}

async fn find_board(conn: &mut PgConnection, board_id: i32) -> BoardResult<Board> {
    sqlx::query_as::<_, Board>(&format!("SELECT {} FROM boards WHERE id = $1", BOARD_COLUMNS))
        .bind(board_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(BoardError::NotFound("Board"))
}
