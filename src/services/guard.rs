//! Access policy guard: the single place that decides whether an actor may touch a
//! board.
//!
//! Membership management needs `Role::MANAGERS`; everything else on a board (the
//! board itself, lists, cards and their children) needs any membership
//! (`Role::ANY`). Attachment deletion adds an uploader check on top, in
//! `services::attachments`.

use sqlx::PgConnection;

use super::error::{BoardError, BoardResult};
use crate::models::{Membership, Role, UserIdentity};

/// Something that lives inside a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Board(i32),
    List(i32),
    Card(i32),
    Checklist(i32),
    ChecklistItem(i32),
    Comment(i32),
    Label(i32),
    Attachment(i32),
}

impl Scope {
    fn entity(&self) -> &'static str {
        match self {
            Scope::Board(_) => "Board",
            Scope::List(_) => "List",
            Scope::Card(_) => "Card",
            Scope::Checklist(_) => "Checklist",
            Scope::ChecklistItem(_) => "Checklist item",
            Scope::Comment(_) => "Comment",
            Scope::Label(_) => "Label",
            Scope::Attachment(_) => "Attachment",
        }
    }

    fn board_query(&self) -> (&'static str, i32) {
        match *self {
            Scope::Board(id) => ("SELECT id FROM boards WHERE id = $1", id),
            Scope::List(id) => ("SELECT board_id FROM lists WHERE id = $1", id),
            Scope::Card(id) => (
                "SELECT l.board_id FROM cards c JOIN lists l ON l.id = c.list_id WHERE c.id = $1",
                id,
            ),
            Scope::Checklist(id) => (
                "SELECT l.board_id FROM checklists cl
                 JOIN cards c ON c.id = cl.card_id
                 JOIN lists l ON l.id = c.list_id
                 WHERE cl.id = $1",
                id,
            ),
            Scope::ChecklistItem(id) => (
                "SELECT l.board_id FROM checklist_items i
                 JOIN checklists cl ON cl.id = i.checklist_id
                 JOIN cards c ON c.id = cl.card_id
                 JOIN lists l ON l.id = c.list_id
                 WHERE i.id = $1",
                id,
            ),
            Scope::Comment(id) => (
                "SELECT l.board_id FROM comments m
                 JOIN cards c ON c.id = m.card_id
                 JOIN lists l ON l.id = c.list_id
                 WHERE m.id = $1",
                id,
            ),
            Scope::Label(id) => ("SELECT board_id FROM labels WHERE id = $1", id),
            Scope::Attachment(id) => (
                "SELECT l.board_id FROM attachments a
                 JOIN cards c ON c.id = a.card_id
                 JOIN lists l ON l.id = c.list_id
                 WHERE a.id = $1",
                id,
            ),
        }
    }
}

/// Resolves the board that owns `scope`, or `NotFound` for the scoped entity.
pub async fn board_of(conn: &mut PgConnection, scope: Scope) -> BoardResult<i32> {
    let (sql, id) = scope.board_query();
    sqlx::query_scalar::<_, i32>(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(BoardError::NotFound(scope.entity()))
}

/// Looks up the actor's membership on `board_id` and checks its role against
/// `required`.
///
/// Fails with `NotFound` if the board does not exist, `NotAMember` if the actor has
/// no membership, and `Forbidden` if the membership's role is not in `required`.
pub async fn authorize(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
    required: &[Role],
) -> BoardResult<Membership> {
    let membership = sqlx::query_as::<_, Membership>(
        "SELECT id, board_id, user_id, role, added_at
         FROM board_memberships WHERE board_id = $1 AND user_id = $2",
    )
    .bind(board_id)
    .bind(actor.id)
    .fetch_optional(&mut *conn)
    .await?;

    if membership.is_none() {
        board_of(conn, Scope::Board(board_id)).await?;
    }
    check(membership, required)
}

/// Resolves `scope` to its board and authorizes the actor there.
pub async fn authorize_in(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    scope: Scope,
    required: &[Role],
) -> BoardResult<Membership> {
    let board_id = board_of(conn, scope).await?;
    authorize(conn, actor, board_id, required).await
}

/// The role decision on its own, given the actor's membership row (if any).
pub fn check(membership: Option<Membership>, required: &[Role]) -> BoardResult<Membership> {
    match membership {
        None => Err(BoardError::NotAMember),
        Some(m) if required.contains(&m.role) => Ok(m),
        Some(_) => Err(BoardError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn membership(role: Role) -> Membership {
        Membership {
            id: 1,
            board_id: 10,
            user_id: 100,
            role,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_membership_is_not_a_member() {
        assert!(matches!(check(None, Role::ANY), Err(BoardError::NotAMember)));
    }

    #[test]
    fn test_role_outside_required_set_is_forbidden() {
        assert!(matches!(
            check(Some(membership(Role::Member)), Role::MANAGERS),
            Err(BoardError::Forbidden)
        ));
    }

    #[test]
    fn test_allowed_roles_pass() {
        for role in [Role::Owner, Role::Admin] {
            let m = check(Some(membership(role)), Role::MANAGERS).unwrap();
            assert_eq!(m.role, role);
        }
        assert!(check(Some(membership(Role::Member)), Role::ANY).is_ok());
    }

    #[test]
    fn test_scope_entity_names() {
        assert_eq!(Scope::Card(1).entity(), "Card");
        assert_eq!(Scope::ChecklistItem(1).entity(), "Checklist item");
    }
}
