//! Database models

use crate::utils::{lenient_date, parse_datetime_or_now};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

/// Error type for parsing models from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidUserRole(String),
    InvalidPostType(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidUserRole(s) => write!(f, "Invalid user role: {}", s),
            ParseError::InvalidPostType(s) => write!(f, "Invalid post type: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

// ==================== Users ====================

/// User role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Member,
    SocietyHead,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::SocietyHead => "society_head",
        }
    }
}

impl FromStr for UserRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(UserRole::Member),
            "society_head" => Ok(UserRole::SocietyHead),
            _ => Err(ParseError::InvalidUserRole(s.to_string())),
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: UserRole,
}

// ==================== Posts ====================

/// Kind of announcement a post carries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    News,
    Event,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::News => "news",
            PostType::Event => "event",
        }
    }
}

impl FromStr for PostType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news" => Ok(PostType::News),
            "event" => Ok(PostType::Event),
            _ => Err(ParseError::InvalidPostType(s.to_string())),
        }
    }
}

/// Where an event takes place
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub campus: Option<String>,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub room_no: Option<String>,
}

/// When an event takes place
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_date_range: bool,
    #[serde(default)]
    pub is_time_range: bool,
}

/// Public projection of a post's author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// The author-editable part of a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub post_type: PostType,
    pub heading: String,
    pub body: String,
    pub location: Location,
    pub event_details: EventDetails,
}

/// Post model, joined with its author
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub post_type: PostType,
    pub heading: String,
    pub body: String,
    pub location: Location,
    pub event_details: EventDetails,
    pub author: PostAuthor,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Copy out the author-editable fields
    pub fn content(&self) -> PostContent {
        PostContent {
            post_type: self.post_type,
            heading: self.heading.clone(),
            body: self.body.clone(),
            location: self.location.clone(),
            event_details: self.event_details.clone(),
        }
    }
}

/// New post (for insertion)
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub author_username: String,
    pub content: PostContent,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let role_str: String = row.try_get("role")?;
        let role = UserRole::from_str(&role_str).map_err(|e| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: Box::new(e),
        })?;
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            password_hash: row.try_get("password_hash")?,
            role,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

impl TryFrom<&sqlx::sqlite::SqliteRow> for Post {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        let post_type_str: String = row.try_get("post_type")?;
        let post_type = PostType::from_str(&post_type_str).map_err(|e| sqlx::Error::ColumnDecode {
            index: "post_type".to_string(),
            source: Box::new(e),
        })?;
        let author_username: String = row.try_get("author_username")?;

        // LEFT JOIN: fall back to the denormalized username if the user row is gone
        let joined_username: Option<String> = row.try_get("user_username")?;
        let first_name: Option<String> = row.try_get("user_first_name")?;
        let last_name: Option<String> = row.try_get("user_last_name")?;

        Ok(Post {
            id: row.try_get("id")?,
            post_type,
            heading: row.try_get("heading")?,
            body: row.try_get("body")?,
            location: Location {
                campus: row.try_get("campus")?,
                floor: row.try_get("floor")?,
                room_no: row.try_get("room_no")?,
            },
            event_details: EventDetails {
                start_date: row.try_get("start_date")?,
                end_date: row.try_get("end_date")?,
                start_time: row.try_get("start_time")?,
                end_time: row.try_get("end_time")?,
                is_date_range: row.try_get("is_date_range")?,
                is_time_range: row.try_get("is_time_range")?,
            },
            author: PostAuthor {
                id: row.try_get("author_id")?,
                username: joined_username.unwrap_or_else(|| author_username.clone()),
                first_name: first_name.unwrap_or_default(),
                last_name: last_name.unwrap_or_default(),
            },
            author_username,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}
