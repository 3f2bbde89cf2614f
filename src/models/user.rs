use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A registered account, as returned by the API. The password hash never leaves the
/// identity service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The authenticated actor handed to every core operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: i32,
    pub username: String,
}

/// Compact user shape nested in membership listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
}

/// Profile fields a user may change about themself. Email is read-only.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileInput {
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    /// Case-insensitive match against username or email.
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_input_validation() {
        let input = ProfileInput {
            first_name: Some("a".repeat(151)),
            last_name: None,
            avatar: None,
        };
        assert!(input.validate().is_err());

        let input = ProfileInput {
            first_name: Some("Alice".to_string()),
            last_name: Some("Liddell".to_string()),
            avatar: Some("https://example.com/a.png".to_string()),
        };
        assert!(input.validate().is_ok());
    }
}
