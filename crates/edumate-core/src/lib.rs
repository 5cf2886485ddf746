//! EduMate Core Business Logic
//!
//! This crate provides the account flows (registration, login, profile,
//! token authentication) and the post lifecycle with its validation rules.

pub mod account;
pub mod error;
pub mod posts;

pub use account::{AccountService, Registration, Session, UserProfile};
pub use error::CoreError;
pub use posts::{ListParams, PostInput, PostPage, PostPatch, PostService};
