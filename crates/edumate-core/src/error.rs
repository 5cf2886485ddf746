//! Core error types

use edumate_auth::AuthError;
use edumate_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    Authentication,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(DbError),
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(msg) => CoreError::Conflict(msg),
            DbError::NotFound(msg) => CoreError::NotFound(msg),
            other => CoreError::Database(other),
        }
    }
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InsufficientPermissions => {
                CoreError::Forbidden("Insufficient permissions".to_string())
            }
            AuthError::PasswordHash(msg) => CoreError::Internal(msg),
            e if e.is_unauthenticated() => CoreError::InvalidToken,
            e => CoreError::Internal(e.to_string()),
        }
    }
}
