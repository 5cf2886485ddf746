//! Request and response bodies

use edumate_core::UserProfile;
use edumate_db::Post;
use serde::{Deserialize, Serialize};

/// Login request; the credential may be sent as `usernameOrEmail`,
/// `username` or `email`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default, alias = "username", alias = "email")]
    pub username_or_email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// A single post, optionally with a confirmation message
#[derive(Debug, Serialize)]
pub struct PostResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub post: Post,
}
