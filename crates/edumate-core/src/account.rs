//! Account service: registration, login, profile and token authentication

use chrono::{DateTime, Utc};
use edumate_auth::{AuthUser, JwtManager, hash_password, verify_password};
use edumate_db::{Database, NewUser, User, UserRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum allowed length for names and emails
const MAX_FIELD_LENGTH: usize = 128;

/// Registration input
///
/// There is deliberately no role field: every new account is a member.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Public projection of a user (never includes the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// A freshly issued token together with the user it identifies
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

/// Account operations backed by the user store and the token service
pub struct AccountService {
    db: Database,
    jwt: Arc<JwtManager>,
    /// Verified against when the login is unknown, so both failure paths cost the same
    dummy_hash: String,
}

impl AccountService {
    /// Create a new account service
    pub fn new(db: Database, jwt: Arc<JwtManager>) -> Result<Self, CoreError> {
        let dummy_hash = hash_password("edumate-login-timing-guard")?;
        Ok(Self {
            db,
            jwt,
            dummy_hash,
        })
    }

    /// Register a new member account and sign them in
    pub async fn register(&self, registration: Registration) -> Result<Session, CoreError> {
        let username = required(registration.username, "username")?;
        let email = required(registration.email, "email")?.to_lowercase();
        let first_name = required(registration.first_name, "firstName")?;
        let last_name = required(registration.last_name, "lastName")?;
        let password = registration
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| CoreError::Validation("password is required".to_string()))?;

        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&password)?;
        for (field, value) in [("firstName", &first_name), ("lastName", &last_name)] {
            if value.len() > MAX_FIELD_LENGTH {
                return Err(CoreError::Validation(format!(
                    "{} exceeds maximum length of {} characters",
                    field, MAX_FIELD_LENGTH
                )));
            }
        }

        debug!("Registering user: {}", username);

        // Fail fast before paying for the hash; the store re-checks on insert
        if self.db.user_exists(&username, &email).await? {
            return Err(CoreError::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_blocking(password).await?;

        let user = self
            .db
            .insert_user(NewUser {
                username,
                email,
                first_name,
                last_name,
                password_hash,
                role: UserRole::Member,
            })
            .await?;

        info!("Registered user {} (id {})", user.username, user.id);
        self.issue_session(&user)
    }

    /// Sign in with a username or email and a password
    ///
    /// Unknown users and wrong passwords fail with the same error.
    pub async fn login(&self, login: &str, password: &str) -> Result<Session, CoreError> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(CoreError::Validation(
                "Username or email and password are required".to_string(),
            ));
        }
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(CoreError::Validation(format!(
                "Password exceeds maximum length of {} characters",
                MAX_PASSWORD_LENGTH
            )));
        }

        // Emails are stored lowercased; usernames cannot contain '@'
        let lookup = if login.contains('@') {
            login.to_lowercase()
        } else {
            login.to_string()
        };

        debug!("Login attempt for: {}", lookup);

        // Find user - but don't return early to prevent timing attacks
        let user = self.db.get_user_by_login(&lookup).await?;
        let hash_to_verify = match &user {
            Some(u) => u.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };

        let password_valid = verify_blocking(password.to_string(), hash_to_verify).await?;

        let user = match (user, password_valid) {
            (Some(u), true) => u,
            _ => {
                warn!("Failed login attempt for: {}", lookup);
                return Err(CoreError::Authentication);
            }
        };

        info!("User {} logged in successfully", user.username);
        self.issue_session(&user)
    }

    /// Fetch the public profile of a user
    pub async fn profile(&self, user_id: i64) -> Result<UserProfile, CoreError> {
        let user = self
            .db
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("User not found".to_string()))?;
        Ok(UserProfile::from(&user))
    }

    /// Verify a bearer token and resolve the identity behind it
    ///
    /// The role comes from the stored user, not from the token, and a token
    /// for a user that no longer exists is rejected.
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, CoreError> {
        let claims = self.jwt.validate_token(token)?;
        let user_id = claims.user_id()?;

        let user = self.db.get_user_by_id(user_id).await?.ok_or_else(|| {
            debug!("Token subject {} no longer exists", user_id);
            CoreError::InvalidToken
        })?;

        Ok(AuthUser::from_user(&user))
    }

    fn issue_session(&self, user: &User) -> Result<Session, CoreError> {
        let token = self.jwt.generate_token(user.id, user.role)?;
        Ok(Session {
            token,
            expires_in: self.jwt.expires_in(),
            user: UserProfile::from(user),
        })
    }
}

// ==================== Input Validation ====================

fn required(value: Option<String>, field: &str) -> Result<String, CoreError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::Validation(format!("{} is required", field)))
}

/// Validate username format and length
fn validate_username(username: &str) -> Result<(), CoreError> {
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    // Only allow alphanumeric characters, underscores, and hyphens
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(CoreError::Validation(
            "Username can only contain alphanumeric characters, underscores, and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), CoreError> {
    let valid = email.len() <= MAX_FIELD_LENGTH
        && !email.chars().any(char::is_whitespace)
        && matches!(email.split_once('@'), Some((local, domain)) if !local.is_empty() && !domain.is_empty());
    if !valid {
        return Err(CoreError::Validation("Email address is invalid".to_string()));
    }
    Ok(())
}

/// Validate password length
fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// Argon2 is CPU-bound; keep it off the async workers
async fn hash_blocking(password: String) -> Result<String, CoreError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CoreError::Internal(format!("Task join error: {}", e)))?
        .map_err(CoreError::from)
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, CoreError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| CoreError::Internal(format!("Task join error: {}", e)))?
        .map_err(CoreError::from)
}
