//! EduMate Database Layer
//!
//! This crate provides the persistence layer for EduMate users and posts,
//! using SQLite via sqlx. Uniqueness of usernames and emails is enforced
//! here, at the store level.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::{Database, PostQuery};

