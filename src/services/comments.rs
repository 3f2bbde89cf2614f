use sqlx::PgConnection;

use super::error::{BoardError, BoardResult};
use super::events::{BoardEvent, CardRef, Outcome};
use super::guard::{self, Scope};
use crate::models::{Comment, CommentInput, Role, UserIdentity};

const COMMENT_COLUMNS: &str = "id, card_id, author_id, text, created_at";

/// Comments of a card, oldest first.
pub async fn list_comments(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    card_id: i32,
) -> BoardResult<Vec<Comment>> {
    guard::authorize_in(conn, actor, Scope::Card(card_id), Role::ANY).await?;
    let comments = sqlx::query_as::<_, Comment>(&format!(
        "SELECT {} FROM comments WHERE card_id = $1 ORDER BY created_at, id",
        COMMENT_COLUMNS
    ))
    .bind(card_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(comments)
}

/// Posts a comment as the actor. The outcome carries a `CommentCreated` event so
/// mentioned users get notified.
pub async fn create_comment(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    card_id: i32,
    input: CommentInput,
) -> BoardResult<Outcome<Comment>> {
    let membership = guard::authorize_in(conn, actor, Scope::Card(card_id), Role::ANY).await?;

    let card_title: String = sqlx::query_scalar("SELECT title FROM cards WHERE id = $1")
        .bind(card_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(BoardError::NotFound("Card"))?;

    let comment = sqlx::query_as::<_, Comment>(&format!(
        "INSERT INTO comments (card_id, author_id, text) VALUES ($1, $2, $3) RETURNING {}",
        COMMENT_COLUMNS
    ))
    .bind(card_id)
    .bind(actor.id)
    .bind(&input.text)
    .fetch_one(&mut *conn)
    .await?;

    let event = BoardEvent::CommentCreated {
        card: CardRef {
            card_id,
            board_id: membership.board_id,
            title: card_title,
        },
        author: actor.clone(),
        text: input.text,
    };
    Ok(Outcome::with_events(comment, vec![event]))
}

pub async fn delete_comment(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    comment_id: i32,
) -> BoardResult<()> {
    guard::authorize_in(conn, actor, Scope::Comment(comment_id), Role::ANY).await?;
    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
