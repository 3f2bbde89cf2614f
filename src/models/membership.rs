//! Board membership: the role-bearing link between a user and a board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::user::UserSummary;
use crate::services::error::BoardError;

/// Closed set of board roles. Corresponds to the `board_role` SQL enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "board_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    /// Roles allowed to change who is on a board.
    pub const MANAGERS: &'static [Role] = &[Role::Owner, Role::Admin];
    /// Any membership at all.
    pub const ANY: &'static [Role] = &[Role::Owner, Role::Admin, Role::Member];
    /// Roles `addMember` may hand out. Ownership is only created with the board.
    pub const GRANTABLE: &'static [Role] = &[Role::Admin, Role::Member];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = BoardError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            other => Err(BoardError::InvalidRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub id: i32,
    pub board_id: i32,
    pub user_id: i32,
    pub role: Role,
    pub added_at: DateTime<Utc>,
}

/// Membership joined with its user, as shown on a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDetail {
    pub id: i32,
    pub role: Role,
    pub added_at: DateTime<Utc>,
    pub user: UserSummary,
}

/// Flat row behind `MemberDetail`.
#[derive(Debug, FromRow)]
pub(crate) struct MemberRow {
    pub id: i32,
    pub role: Role,
    pub added_at: DateTime<Utc>,
    pub user_id: i32,
    pub username: String,
    pub email: String,
}

impl From<MemberRow> for MemberDetail {
    fn from(row: MemberRow) -> Self {
        MemberDetail {
            id: row.id,
            role: row.role,
            added_at: row.added_at,
            user: UserSummary {
                id: row.user_id,
                username: row.username,
                email: row.email,
            },
        }
    }
}

/// Payload for adding a user to a board. The role stays a raw string so that an
/// unknown value is reported as an invalid role rather than a malformed body.
#[derive(Debug, Deserialize)]
pub struct AddMemberInput {
    pub user_id: i32,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    Role::Member.as_str().to_string()
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleInput {
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("owner".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("member".parse::<Role>().unwrap(), Role::Member);

        match "Owner".parse::<Role>() {
            Err(BoardError::InvalidRole(raw)) => assert_eq!(raw, "Owner"),
            other => panic!("expected InvalidRole, got {:?}", other),
        }
        assert!("viewer".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_sets() {
        assert!(Role::MANAGERS.contains(&Role::Admin));
        assert!(!Role::MANAGERS.contains(&Role::Member));
        assert!(!Role::GRANTABLE.contains(&Role::Owner));
        assert_eq!(Role::ANY.len(), 3);
    }

    #[test]
    fn test_add_member_defaults_to_member_role() {
        let input: AddMemberInput = serde_json::from_str(r#"{"user_id": 7}"#).unwrap();
        assert_eq!(input.user_id, 7);
        assert_eq!(input.role, "member");
    }
}
