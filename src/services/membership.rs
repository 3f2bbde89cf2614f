//! Membership ledger: who belongs to a board and with which role.
//!
//! # Invariants
//! - At most one membership per `(board, user)`; backed by a unique constraint.
//! - Every board keeps at least one `owner`. Demotion and removal both re-read the
//!   owner count after locking the board row, so two concurrent demotions of two
//!   different owners cannot both see a count of two.
//! - `owner` is only ever granted at board creation or through `change_role`.

use log::info;
use sqlx::PgConnection;

use super::error::{is_unique_violation, BoardError, BoardResult};
use super::events::{BoardEvent, Outcome};
use super::guard;
use crate::models::membership::MemberRow;
use crate::models::{AddMemberInput, MemberDetail, Membership, Role, UserIdentity};

const MEMBER_DETAIL_SELECT: &str = "SELECT m.id, m.role, m.added_at, u.id AS user_id, u.username, u.email
     FROM board_memberships m JOIN users u ON u.id = m.user_id";

/// Bootstrap step of board creation: makes `creator_id` the board's first owner.
/// Not separately authorizable; call it exactly once, in the creating transaction.
pub async fn create_board_ownership(
    conn: &mut PgConnection,
    board_id: i32,
    creator_id: i32,
) -> BoardResult<Membership> {
    let membership = sqlx::query_as::<_, Membership>(
        "INSERT INTO board_memberships (board_id, user_id, role)
         VALUES ($1, $2, 'owner')
         RETURNING id, board_id, user_id, role, added_at",
    )
    .bind(board_id)
    .bind(creator_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(membership)
}

pub async fn list_members(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
) -> BoardResult<Vec<MemberDetail>> {
    guard::authorize(conn, actor, board_id, Role::ANY).await?;
    members_of(conn, board_id).await
}

/// Roster of a board without an access check, ordered by join time.
pub(crate) async fn members_of(
    conn: &mut PgConnection,
    board_id: i32,
) -> BoardResult<Vec<MemberDetail>> {
    let rows = sqlx::query_as::<_, MemberRow>(&format!(
        "{} WHERE m.board_id = $1 ORDER BY m.added_at, m.id",
        MEMBER_DETAIL_SELECT
    ))
    .bind(board_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(MemberDetail::from).collect())
}

/// Adds `input.user_id` to the board with an `admin` or `member` role.
pub async fn add_member(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
    input: AddMemberInput,
) -> BoardResult<Outcome<MemberDetail>> {
    guard::authorize(conn, actor, board_id, Role::MANAGERS).await?;
    let board_title = lock_board(conn, board_id).await?;

    if find_membership_of_user(conn, board_id, input.user_id)
        .await?
        .is_some()
    {
        return Err(BoardError::AlreadyMember);
    }

    let role: Role = input.role.parse()?;
    if !Role::GRANTABLE.contains(&role) {
        return Err(BoardError::InvalidRole(input.role));
    }

    let user_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(input.user_id)
        .fetch_one(&mut *conn)
        .await?;
    if !user_exists {
        return Err(BoardError::NotFound("User"));
    }

    let inserted = sqlx::query_scalar::<_, i32>(
        "INSERT INTO board_memberships (board_id, user_id, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(board_id)
    .bind(input.user_id)
    .bind(role)
    .fetch_one(&mut *conn)
    .await;

    let membership_id = match inserted {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => return Err(BoardError::AlreadyMember),
        Err(e) => return Err(e.into()),
    };

    info!(
        "user {} added user {} to board {} as {}",
        actor.id, input.user_id, board_id, role
    );

    let detail = member_detail(conn, board_id, membership_id).await?;
    let event = BoardEvent::MemberAdded {
        board_id,
        board_title,
        actor: actor.clone(),
        user_id: input.user_id,
        role,
    };
    Ok(Outcome::with_events(detail, vec![event]))
}

/// Changes the role of membership `membership_id` on `board_id`.
///
/// Demoting an owner is rejected with `LastOwnerViolation` when they are the only
/// owner left.
pub async fn change_role(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
    membership_id: i32,
    new_role: &str,
) -> BoardResult<MemberDetail> {
    guard::authorize(conn, actor, board_id, Role::MANAGERS).await?;
    lock_board(conn, board_id).await?;

    let target = find_membership(conn, board_id, membership_id)
        .await?
        .ok_or(BoardError::NotFound("Membership"))?;
    let new_role: Role = new_role.parse()?;

    if target.role == Role::Owner && new_role != Role::Owner {
        let owners = count_owners(conn, board_id).await?;
        ensure_owner_remains(target.role, owners)?;
    }

    sqlx::query("UPDATE board_memberships SET role = $1 WHERE id = $2")
        .bind(new_role)
        .bind(membership_id)
        .execute(&mut *conn)
        .await?;

    info!(
        "user {} changed membership {} on board {} from {} to {}",
        actor.id, membership_id, board_id, target.role, new_role
    );

    member_detail(conn, board_id, membership_id).await
}

/// Removes a membership. Managers may remove anyone; any member may remove
/// themself. The sole owner can never be removed.
pub async fn remove_member(
    conn: &mut PgConnection,
    actor: &UserIdentity,
    board_id: i32,
    membership_id: i32,
) -> BoardResult<()> {
    let acting = guard::authorize(conn, actor, board_id, Role::ANY).await?;
    lock_board(conn, board_id).await?;

    let target = find_membership(conn, board_id, membership_id)
        .await?
        .ok_or(BoardError::NotFound("Membership"))?;

    let leaving_self = target.user_id == actor.id;
    if !leaving_self && !Role::MANAGERS.contains(&acting.role) {
        return Err(BoardError::Forbidden);
    }

    if target.role == Role::Owner {
        let owners = count_owners(conn, board_id).await?;
        ensure_owner_remains(target.role, owners)?;
    }

    sqlx::query("DELETE FROM board_memberships WHERE id = $1")
        .bind(membership_id)
        .execute(&mut *conn)
        .await?;

    info!(
        "user {} removed membership {} (user {}) from board {}",
        actor.id, membership_id, target.user_id, board_id
    );
    Ok(())
}

/// The last-owner rule: a membership currently holding `current` may stop being an
/// owner only if more than one owner exists.
pub fn ensure_owner_remains(current: Role, owner_count: i64) -> BoardResult<()> {
    if current == Role::Owner && owner_count <= 1 {
        return Err(BoardError::LastOwnerViolation);
    }
    Ok(())
}

/// Takes a row lock on the board so membership mutations on it run one at a time.
/// Returns the board title.
async fn lock_board(conn: &mut PgConnection, board_id: i32) -> BoardResult<String> {
    sqlx::query_scalar::<_, String>("SELECT title FROM boards WHERE id = $1 FOR UPDATE")
        .bind(board_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(BoardError::NotFound("Board"))
}

async fn count_owners(conn: &mut PgConnection, board_id: i32) -> BoardResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM board_memberships WHERE board_id = $1 AND role = 'owner'",
    )
    .bind(board_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}

async fn find_membership(
    conn: &mut PgConnection,
    board_id: i32,
    membership_id: i32,
) -> BoardResult<Option<Membership>> {
    let membership = sqlx::query_as::<_, Membership>(
        "SELECT id, board_id, user_id, role, added_at
         FROM board_memberships WHERE id = $1 AND board_id = $2",
    )
    .bind(membership_id)
    .bind(board_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(membership)
}

async fn find_membership_of_user(
    conn: &mut PgConnection,
    board_id: i32,
    user_id: i32,
) -> BoardResult<Option<Membership>> {
    let membership = sqlx::query_as::<_, Membership>(
        "SELECT id, board_id, user_id, role, added_at
         FROM board_memberships WHERE board_id = $1 AND user_id = $2",
    )
    .bind(board_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(membership)
}

async fn member_detail(
    conn: &mut PgConnection,
    board_id: i32,
    membership_id: i32,
) -> BoardResult<MemberDetail> {
    let row = sqlx::query_as::<_, MemberRow>(&format!(
        "{} WHERE m.board_id = $1 AND m.id = $2",
        MEMBER_DETAIL_SELECT
    ))
    .bind(board_id)
    .bind(membership_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(BoardError::NotFound("Membership"))?;
    Ok(row.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sole_owner_cannot_step_down() {
        assert!(matches!(
            ensure_owner_remains(Role::Owner, 1),
            Err(BoardError::LastOwnerViolation)
        ));
    }

    #[test]
    fn test_owner_count_zero_is_rejected() {
        assert!(matches!(
            ensure_owner_remains(Role::Owner, 0),
            Err(BoardError::LastOwnerViolation)
        ));
    }

    #[test]
    fn test_one_of_two_owners_can_step_down() {
        assert!(ensure_owner_remains(Role::Owner, 2).is_ok());
    }

    #[test]
    fn test_non_owners_are_unaffected() {
        assert!(ensure_owner_remains(Role::Admin, 1).is_ok());
        assert!(ensure_owner_remains(Role::Member, 0).is_ok());
    }
}
