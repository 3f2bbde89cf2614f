use crate::error::AppError;
use crate::models::UserIdentity;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Access tokens are valid for three days.
const ACCESS_TOKEN_HOURS: i64 = 72;
/// Refresh tokens are valid for seven days.
const REFRESH_TOKEN_HOURS: i64 = 24 * 7;

/// Distinguishes the two tokens issued at login.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i32,
    /// The user's handle, carried so handlers can build a `UserIdentity` without a lookup.
    pub username: String,
    pub kind: TokenKind,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
}

impl Claims {
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.sub,
            username: self.username.clone(),
        }
    }
}

fn jwt_secret() -> Result<String, AppError> {
    std::env::var("JWT_SECRET").map_err(|_| {
        log::error!("JWT_SECRET is not set");
        AppError::InternalServerError("JWT_SECRET not set".into())
    })
}

fn generate_token(user: &UserIdentity, kind: TokenKind, hours: i64) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(hours))
        .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        kind,
        exp: expiration,
    };

    let secret = jwt_secret()?;

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Issues a bearer token for API requests.
///
/// Requires the `JWT_SECRET` environment variable to be set for signing.
pub fn generate_access_token(user: &UserIdentity) -> Result<String, AppError> {
    generate_token(user, TokenKind::Access, ACCESS_TOKEN_HOURS)
}

/// Issues a token that can only be exchanged for a new access token.
pub fn generate_refresh_token(user: &UserIdentity) -> Result<String, AppError> {
    generate_token(user, TokenKind::Refresh, REFRESH_TOKEN_HOURS)
}

/// Verifies a JWT string and decodes its claims.
///
/// Returns `AppError::InternalServerError` if `JWT_SECRET` is not set, and
/// `AppError::Unauthorized` if the token is malformed, its signature is invalid, it has
/// expired, or it is not of the `expected` kind.
fn verify_token(token: &str, expected: TokenKind) -> Result<Claims, AppError> {
    let secret = jwt_secret()?;
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    if claims.kind != expected {
        return Err(AppError::Unauthorized("Invalid token: wrong token kind".into()));
    }
    Ok(claims)
}

pub fn verify_access_token(token: &str) -> Result<Claims, AppError> {
    verify_token(token, TokenKind::Access)
}

pub fn verify_refresh_token(token: &str) -> Result<Claims, AppError> {
    verify_token(token, TokenKind::Refresh)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref JWT_ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    }

    // Helper to run test logic with a temporarily set JWT_SECRET
    pub(crate) fn run_with_temp_jwt_secret<F>(secret_value: &str, test_logic: F)
    where
        F: FnOnce(),
    {
        let _guard = JWT_ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let original_secret_val = std::env::var("JWT_SECRET").ok();
        std::env::set_var("JWT_SECRET", secret_value);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(test_logic));

        if let Some(original) = original_secret_val {
            std::env::set_var("JWT_SECRET", original);
        } else {
            std::env::remove_var("JWT_SECRET");
        }

        if let Err(panic_payload) = result {
            std::panic::resume_unwind(panic_payload);
        }
    }

    fn alice() -> UserIdentity {
        UserIdentity {
            id: 1,
            username: "alice".to_string(),
        }
    }

    #[test]
    fn test_token_generation_and_verification() {
        run_with_temp_jwt_secret("test_secret_for_gen_verify", || {
            let token = generate_access_token(&alice()).unwrap();
            let claims = verify_access_token(&token).unwrap();
            assert_eq!(claims.identity(), alice());
            assert_eq!(claims.kind, TokenKind::Access);
        });
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        run_with_temp_jwt_secret("test_secret_for_kinds", || {
            let refresh = generate_refresh_token(&alice()).unwrap();
            assert!(verify_refresh_token(&refresh).is_ok());
            match verify_access_token(&refresh) {
                Err(AppError::Unauthorized(msg)) => assert!(msg.contains("wrong token kind")),
                other => panic!("Refresh token must not pass as access token: {:?}", other),
            }

            let access = generate_access_token(&alice()).unwrap();
            assert!(verify_refresh_token(&access).is_err());
        });
    }

    #[test]
    fn test_token_expiration() {
        run_with_temp_jwt_secret("test_secret_for_expiration", || {
            let expiration = chrono::Utc::now()
                .checked_sub_signed(chrono::Duration::hours(2))
                .expect("valid timestamp")
                .timestamp() as usize;

            let claims_expired = Claims {
                sub: 2,
                username: "bob".to_string(),
                kind: TokenKind::Access,
                exp: expiration,
            };
            let expired_token = encode(
                &Header::default(),
                &claims_expired,
                &EncodingKey::from_secret("test_secret_for_expiration".as_bytes()),
            )
            .unwrap();

            match verify_access_token(&expired_token) {
                Err(AppError::Unauthorized(msg)) => {
                    assert!(msg.contains("Invalid token: ExpiredSignature"));
                }
                Ok(_) => panic!("Token should have been invalid due to expiration"),
                Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
            }
        });
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = run_and_return(|| generate_access_token(&alice()).unwrap());
        run_with_temp_jwt_secret("a_completely_different_secret", || {
            match verify_access_token(&token) {
                Err(AppError::Unauthorized(msg)) => {
                    assert!(msg.contains("Invalid token: InvalidSignature"));
                }
                Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
                Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
            }
        });
    }

    fn run_and_return<T>(f: impl FnOnce() -> T) -> T {
        let mut out = None;
        run_with_temp_jwt_secret("the_original_secret", || out = Some(f()));
        out.expect("closure ran")
    }
}
