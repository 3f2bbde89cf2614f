pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{
    generate_access_token, generate_refresh_token, verify_access_token, verify_refresh_token,
    Claims, TokenKind,
};

lazy_static! {
    // Usernames double as @mention handles: the mention alphabet, not ending in `.`.
    pub static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9_.-]*[a-zA-Z0-9_-]$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username, also the user's @mention handle.
    /// Must be between 3 and 32 characters of letters, digits, `_`, `-` or `.`,
    /// and must not end with `.`.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username may only contain letters, digits, underscores, hyphens or dots, and may not end with a dot"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    /// Must be between 6 and 72 bytes long (bcrypt ignores anything past 72).
    #[validate(length(min = 6, max = 72))]
    pub password: String,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Short-lived token sent as `Authorization: Bearer ...`.
    pub access_token: String,
    /// Longer-lived token accepted only by `/api/auth/refresh`.
    pub refresh_token: String,
    pub user_id: i32,
}
