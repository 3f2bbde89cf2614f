//! Checklists and their items, both in creation (id) order.

use sqlx::PgConnection;
use std::collections::HashMap;

use super::error::{BoardError, BoardResult};
use super::guard::{self, Scope};
use crate::models::{
    Checklist, ChecklistInput, ChecklistItem, ChecklistItemInput, ChecklistItemUpdate,
    ChecklistWithItems, Role, UserIdentity,
};

const ITEM_COLUMNS: &str = "id, checklist_id, text, completed, created_at";

pub async fn list_checklists(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    card_id: i32,
) -> BoardResult<Vec<ChecklistWithItems>> {
    guard::authorize_in(conn, actor, Scope::Card(card_id), Role::ANY).await?;

    let checklists = sqlx::query_as::<_, Checklist>(
        "SELECT id, card_id, title, created_at FROM checklists
         WHERE card_id = $1 ORDER BY id",
    )
    .bind(card_id)
    .fetch_all(&mut *conn)
    .await?;

    let items = sqlx::query_as::<_, ChecklistItem>(
        "SELECT i.id, i.checklist_id, i.text, i.completed, i.created_at
         FROM checklist_items i
         JOIN checklists cl ON cl.id = i.checklist_id
         WHERE cl.card_id = $1
         ORDER BY i.id",
    )
    .bind(card_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_checklist: HashMap<i32, Vec<ChecklistItem>> = HashMap::new();
    for item in items {
        by_checklist.entry(item.checklist_id).or_default().push(item);
    }
    Ok(checklists
        .into_iter()
        .map(|checklist| {
            let items = by_checklist.remove(&checklist.id).unwrap_or_default();
            ChecklistWithItems { checklist, items }
        })
        .collect())
}

pub async fn create_checklist(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    card_id: i32,
    input: ChecklistInput,
) -> BoardResult<ChecklistWithItems> {
    guard::authorize_in(conn, actor, Scope::Card(card_id), Role::ANY).await?;
    let checklist = sqlx::query_as::<_, Checklist>(
        "INSERT INTO checklists (card_id, title) VALUES ($1, $2)
         RETURNING id, card_id, title, created_at",
    )
    .bind(card_id)
    .bind(input.title)
    .fetch_one(&mut *conn)
    .await?;
    Ok(ChecklistWithItems {
        checklist,
        items: Vec::new(),
    })
}

pub async fn rename_checklist(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    checklist_id: i32,
    input: ChecklistInput,
) -> BoardResult<Checklist> {
    guard::authorize_in(conn, actor, Scope::Checklist(checklist_id), Role::ANY).await?;
    sqlx::query_as::<_, Checklist>(
        "UPDATE checklists SET title = $2 WHERE id = $1
         RETURNING id, card_id, title, created_at",
    )
    .bind(checklist_id)
    .bind(input.title)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(BoardError::NotFound("Checklist"))
}

pub async fn delete_checklist(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    checklist_id: i32,
) -> BoardResult<()> {
    guard::authorize_in(conn, actor, Scope::Checklist(checklist_id), Role::ANY).await?;
    sqlx::query("DELETE FROM checklists WHERE id = $1")
        .bind(checklist_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn add_item(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    checklist_id: i32,
    input: ChecklistItemInput,
) -> BoardResult<ChecklistItem> {
    guard::authorize_in(conn, actor, Scope::Checklist(checklist_id), Role::ANY).await?;
    let item = sqlx::query_as::<_, ChecklistItem>(&format!(
        "INSERT INTO checklist_items (checklist_id, text, completed) VALUES ($1, $2, $3)
         RETURNING {}",
        ITEM_COLUMNS
    ))
    .bind(checklist_id)
    .bind(input.text)
    .bind(input.completed)
    .fetch_one(&mut *conn)
    .await?;
    Ok(item)
}

/// Edits the text and/or toggles completion.
pub async fn update_item(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    item_id: i32,
    input: ChecklistItemUpdate,
) -> BoardResult<ChecklistItem> {
    guard::authorize_in(conn, actor, Scope::ChecklistItem(item_id), Role::ANY).await?;
    sqlx::query_as::<_, ChecklistItem>(&format!(
        "UPDATE checklist_items SET
            text = COALESCE($2, text),
            completed = COALESCE($3, completed)
         WHERE id = $1
         RETURNING {}",
        ITEM_COLUMNS
    ))
    .bind(item_id)
    .bind(input.text)
    .bind(input.completed)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(BoardError::NotFound("Checklist item"))
}

pub async fn delete_item(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    item_id: i32,
) -> BoardResult<()> {
    guard::authorize_in(conn, actor, Scope::ChecklistItem(item_id), Role::ANY).await?;
    sqlx::query("DELETE FROM checklist_items WHERE id = $1")
        .bind(item_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
