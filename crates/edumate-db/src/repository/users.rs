//! User operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::Database;

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, role, created_at, updated_at";

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// Fails with `DbError::Duplicate` if the username or the email is taken.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        // Check if user already exists
        if self.user_exists(&user.username, &user.email).await? {
            return Err(DbError::Duplicate("User already exists".to_string()));
        }

        // The UNIQUE constraints still catch a concurrent registration
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, "User already exists"))?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check whether the username or the email is already registered
    pub async fn user_exists(&self, username: &str, email: &str) -> Result<bool, DbError> {
        let result = sqlx::query(
            "SELECT COUNT(*) as count FROM users WHERE username = ? OR email = ?",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }

    /// Get a user by username or email, in a single lookup
    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, DbError> {
        let sql = format!(
            "SELECT {} FROM users WHERE username = ? OR email = ? LIMIT 1",
            USER_COLUMNS
        );
        let result = sqlx::query(&sql)
            .bind(login)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let result = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }
}
