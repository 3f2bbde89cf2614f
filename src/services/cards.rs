//! Card store. Description and assignee writes emit events for the notifier.

use sqlx::PgConnection;

use super::error::{BoardError, BoardResult};
use super::events::{BoardEvent, CardRef, Outcome};
use super::guard::{self, Scope};
use super::identity;
use crate::models::{Card, CardInput, CardUpdate, Role, UserIdentity};

const CARD_SELECT: &str = r#"SELECT c.id, c.list_id, c.title, c.description, c.due_date, c."order", c.created_at,
        ARRAY(SELECT ca.user_id FROM card_assignees ca WHERE ca.card_id = c.id ORDER BY ca.user_id) AS assignee_ids,
        ARRAY(SELECT cl.label_id FROM card_labels cl WHERE cl.card_id = c.id ORDER BY cl.label_id) AS label_ids
   FROM cards c"#;

/// Every card of a board, ordered by `(order, id)` within the whole board.
pub(crate) async fn cards_of_board(conn: &mut PgConnection, board_id: i32) -> BoardResult<Vec<Card>> {
    let cards = sqlx::query_as::<_, Card>(&format!(
        r#"{} JOIN lists l ON l.id = c.list_id WHERE l.board_id = $1 ORDER BY c."order", c.id"#,
        CARD_SELECT
    ))
    .bind(board_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(cards)
}

pub async fn list_cards(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    list_id: i32,
) -> BoardResult<Vec<Card>> {
    guard::authorize_in(conn, actor, Scope::List(list_id), Role::ANY).await?;
    let cards = sqlx::query_as::<_, Card>(&format!(
        r#"{} WHERE c.list_id = $1 ORDER BY c."order", c.id"#,
        CARD_SELECT
    ))
    .bind(list_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(cards)
}

pub async fn get_card(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    card_id: i32,
) -> BoardResult<Card> {
    guard::authorize_in(conn, actor, Scope::Card(card_id), Role::ANY).await?;
    find_card(conn, card_id).await
}

/// Creates a card; `order` defaults to 0 and ties fall back to id. Initial assignees
/// and mentions notify as if added to an empty card.
pub async fn create_card(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    list_id: i32,
    input: CardInput,
) -> BoardResult<Outcome<Card>> {
    let membership = guard::authorize_in(conn, actor, Scope::List(list_id), Role::ANY).await?;
    let board_id = membership.board_id;

    let assignees = normalize_ids(input.assignee_ids.unwrap_or_default());
    let labels = normalize_ids(input.label_ids.unwrap_or_default());
    check_assignees(conn, &assignees).await?;
    check_labels(conn, board_id, &labels).await?;

    let card_id: i32 = sqlx::query_scalar(
        r#"INSERT INTO cards (list_id, title, description, due_date, "order")
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id"#,
    )
    .bind(list_id)
    .bind(&input.title)
    .bind(input.description.unwrap_or_default())
    .bind(input.due_date)
    .bind(input.order.unwrap_or(0))
    .fetch_one(&mut *conn)
    .await?;

    replace_assignees(conn, card_id, &assignees).await?;
    replace_labels(conn, card_id, &labels).await?;

    let card = find_card(conn, card_id).await?;
    let card_ref = CardRef {
        card_id,
        board_id,
        title: card.title.clone(),
    };
    let mut events = Vec::new();
    if !card.description.is_empty() {
        events.push(BoardEvent::CardDescriptionChanged {
            card: card_ref.clone(),
            actor: actor.clone(),
            old: String::new(),
            new: card.description.clone(),
        });
    }
    if !card.assignee_ids.is_empty() {
        events.push(BoardEvent::CardAssigneesChanged {
            card: card_ref,
            actor: actor.clone(),
            old: Vec::new(),
            new: card.assignee_ids.clone(),
        });
    }
    Ok(Outcome::with_events(card, events))
}

/// Applies a partial update. Emits a description event when the text changed and an
/// assignee event when the assignee set changed.
pub async fn update_card(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    card_id: i32,
    input: CardUpdate,
) -> BoardResult<Outcome<Card>> {
    let membership = guard::authorize_in(conn, actor, Scope::Card(card_id), Role::ANY).await?;
    let board_id = membership.board_id;

    // Serialize concurrent edits of the same card so each diff sees the prior state.
    sqlx::query("SELECT id FROM cards WHERE id = $1 FOR UPDATE")
        .bind(card_id)
        .execute(&mut *conn)
        .await?;
    let before = find_card(conn, card_id).await?;

    if let Some(target_list) = input.list_id {
        let target_board = guard::board_of(conn, Scope::List(target_list)).await?;
        if target_board != board_id {
            return Err(BoardError::invalid_field(
                "list_id",
                "foreign_list",
                "Cards can only move between lists of the same board",
            ));
        }
    }

    sqlx::query(
        r#"UPDATE cards SET
              title = COALESCE($2, title),
              description = COALESCE($3, description),
              due_date = COALESCE($4, due_date),
              "order" = COALESCE($5, "order"),
              list_id = COALESCE($6, list_id)
           WHERE id = $1"#,
    )
    .bind(card_id)
    .bind(input.title)
    .bind(input.description)
    .bind(input.due_date)
    .bind(input.order)
    .bind(input.list_id)
    .execute(&mut *conn)
    .await?;

    if let Some(ids) = input.assignee_ids {
        let assignees = normalize_ids(ids);
        check_assignees(conn, &assignees).await?;
        replace_assignees(conn, card_id, &assignees).await?;
    }
    if let Some(ids) = input.label_ids {
        let labels = normalize_ids(ids);
        check_labels(conn, board_id, &labels).await?;
        replace_labels(conn, card_id, &labels).await?;
    }

    let after = find_card(conn, card_id).await?;
    let card_ref = CardRef {
        card_id,
        board_id,
        title: after.title.clone(),
    };
    let mut events = Vec::new();
    if after.description != before.description {
        events.push(BoardEvent::CardDescriptionChanged {
            card: card_ref.clone(),
            actor: actor.clone(),
            old: before.description,
            new: after.description.clone(),
        });
    }
    if after.assignee_ids != before.assignee_ids {
        events.push(BoardEvent::CardAssigneesChanged {
            card: card_ref,
            actor: actor.clone(),
            old: before.assignee_ids,
            new: after.assignee_ids.clone(),
        });
    }
    Ok(Outcome::with_events(after, events))
}

/// Deletes the card and its children. Returns blob paths to release after commit.
pub async fn delete_card(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    card_id: i32,
) -> BoardResult<Vec<String>> {
    guard::authorize_in(conn, actor, Scope::Card(card_id), Role::ANY).await?;

    let blob_paths: Vec<String> =
        sqlx::query_scalar("SELECT file_path FROM attachments WHERE card_id = $1")
            .bind(card_id)
            .fetch_all(&mut *conn)
            .await?;

    sqlx::query("DELETE FROM cards WHERE id = $1")
        .bind(card_id)
        .execute(&mut *conn)
        .await?;
    Ok(blob_paths)
}

pub(crate) async fn find_card(conn: &mut PgConnection, card_id: i32) -> BoardResult<Card> {
    sqlx::query_as::<_, Card>(&format!("{} WHERE c.id = $1", CARD_SELECT))
        .bind(card_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(BoardError::NotFound("Card"))
}

/// Sorted, duplicate-free copy of `ids`.
fn normalize_ids(mut ids: Vec<i32>) -> Vec<i32> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

async fn check_assignees(conn: &mut PgConnection, assignees: &[i32]) -> BoardResult<()> {
    if identity::missing_users(conn, assignees).await?.is_empty() {
        Ok(())
    } else {
        Err(BoardError::invalid_field(
            "assignee_ids",
            "unknown_user",
            "Every assignee must be an existing user",
        ))
    }
}

async fn check_labels(conn: &mut PgConnection, board_id: i32, labels: &[i32]) -> BoardResult<()> {
    if labels.is_empty() {
        return Ok(());
    }
    let on_board: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM labels WHERE id = ANY($1) AND board_id = $2")
            .bind(labels)
            .bind(board_id)
            .fetch_one(&mut *conn)
            .await?;
    if on_board as usize == labels.len() {
        Ok(())
    } else {
        Err(BoardError::invalid_field(
            "label_ids",
            "foreign_label",
            "Cards can only carry labels of their own board",
        ))
    }
}

async fn replace_assignees(conn: &mut PgConnection, card_id: i32, user_ids: &[i32]) -> BoardResult<()> {
    sqlx::query("DELETE FROM card_assignees WHERE card_id = $1")
        .bind(card_id)
        .execute(&mut *conn)
        .await?;
    if !user_ids.is_empty() {
        sqlx::query("INSERT INTO card_assignees (card_id, user_id) SELECT $1, UNNEST($2::int4[])")
            .bind(card_id)
            .bind(user_ids)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn replace_labels(conn: &mut PgConnection, card_id: i32, label_ids: &[i32]) -> BoardResult<()> {
    sqlx::query("DELETE FROM card_labels WHERE card_id = $1")
        .bind(card_id)
        .execute(&mut *conn)
        .await?;
    if !label_ids.is_empty() {
        sqlx::query("INSERT INTO card_labels (card_id, label_id) SELECT $1, UNNEST($2::int4[])")
            .bind(card_id)
            .bind(label_ids)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ids() {
        assert_eq!(normalize_ids(vec![3, 1, 3, 2, 1]), vec![1, 2, 3]);
        assert!(normalize_ids(Vec::new()).is_empty());
    }
}
