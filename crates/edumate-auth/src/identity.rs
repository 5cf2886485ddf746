//! Verified caller identity

use edumate_db::{User, UserRole};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Authenticated user information
///
/// Built from the stored user record after the bearer token has been
/// verified, and passed explicitly into every operation that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Create from a stored user
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidAuthHeader),
    }
}
