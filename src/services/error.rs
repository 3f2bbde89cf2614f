//! Error kinds reported by the board core.
//!
//! These never carry HTTP semantics; `crate::error::AppError` maps them onto
//! status codes at the edge.

use validator::{ValidationError, ValidationErrors};

/// Result alias used by every core operation.
pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// The actor holds no membership on the board.
    #[error("You are not a member of this board")]
    NotAMember,

    /// The actor is a member, but their role is not allowed to do this.
    #[error("Your role on this board does not allow this action")]
    Forbidden,

    #[error("User is already a member of this board")]
    AlreadyMember,

    #[error("Invalid role `{0}`")]
    InvalidRole(String),

    /// The change would leave the board without any owner.
    #[error("A board must keep at least one owner")]
    LastOwnerViolation,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Field-level validation failure.
    #[error("Validation failed: {0}")]
    Invalid(ValidationErrors),

    #[error("Store failure: {0}")]
    StoreFailure(#[from] sqlx::Error),

    #[error("Blob store failure: {0}")]
    Blob(#[from] std::io::Error),
}

impl BoardError {
    /// Builds an `Invalid` error for a single field.
    pub fn invalid_field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        BoardError::Invalid(errors)
    }
}

impl From<ValidationErrors> for BoardError {
    fn from(errors: ValidationErrors) -> Self {
        BoardError::Invalid(errors)
    }
}

/// Postgres SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// True when `error` was raised by a unique constraint.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
