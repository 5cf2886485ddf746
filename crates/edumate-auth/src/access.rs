//! Role-based access control
//!
//! Authorization is a pure check of a role against an allow-list. Which roles
//! may perform which action is data (`AccessPolicy`), loaded from config.

use edumate_db::UserRole;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;
use crate::identity::AuthUser;

/// Role-gated actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreatePost,
    SocietyLounge,
}

/// Allowed roles per action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessPolicy {
    #[serde(default = "society_heads_only")]
    pub create_post: Vec<UserRole>,
    #[serde(default = "society_heads_only")]
    pub society_lounge: Vec<UserRole>,
}

fn society_heads_only() -> Vec<UserRole> {
    vec![UserRole::SocietyHead]
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            create_post: society_heads_only(),
            society_lounge: society_heads_only(),
        }
    }
}

impl AccessPolicy {
    /// Roles allowed to perform an action
    pub fn allowed_roles(&self, action: Action) -> &[UserRole] {
        match action {
            Action::CreatePost => &self.create_post,
            Action::SocietyLounge => &self.society_lounge,
        }
    }

    /// Check a user against the allow-list of an action
    pub fn check(&self, user: &AuthUser, action: Action) -> Result<(), AuthError> {
        debug!("Checking {:?} for user {} ({})", action, user.username, user.role.as_str());
        authorize(user, self.allowed_roles(action))
    }
}

/// Authorize a user against an allow-list of roles
pub fn authorize(user: &AuthUser, allowed: &[UserRole]) -> Result<(), AuthError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AuthError::InsufficientPermissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            id: 1,
            username: "someone".to_string(),
            role,
        }
    }

    #[test]
    fn test_authorize_allow_list() {
        assert!(authorize(&user(UserRole::SocietyHead), &[UserRole::SocietyHead]).is_ok());
        assert!(matches!(
            authorize(&user(UserRole::Member), &[UserRole::SocietyHead]),
            Err(AuthError::InsufficientPermissions)
        ));
        assert!(authorize(&user(UserRole::Member), &[]).is_err());
    }

    #[test]
    fn test_default_policy_gates_post_creation() {
        let policy = AccessPolicy::default();
        assert!(policy.check(&user(UserRole::SocietyHead), Action::CreatePost).is_ok());
        assert!(policy.check(&user(UserRole::Member), Action::CreatePost).is_err());
        assert!(policy.check(&user(UserRole::Member), Action::SocietyLounge).is_err());
    }

    #[test]
    fn test_policy_from_config() {
        let policy: AccessPolicy =
            toml::from_str(r#"create_post = ["member", "society_head"]"#).unwrap();
        assert!(policy.check(&user(UserRole::Member), Action::CreatePost).is_ok());
        // Unlisted actions keep their default
        assert_eq!(policy.society_lounge, vec![UserRole::SocietyHead]);
    }
}
