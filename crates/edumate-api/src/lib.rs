//! EduMate REST API
//!
//! This crate provides the Axum-based HTTP API for EduMate: account
//! endpoints under `/api/users` and the post endpoints under `/api/posts`.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
