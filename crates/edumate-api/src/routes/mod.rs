//! API routes

mod auth;
mod health;
mod posts;
pub mod types;
mod users;

use axum::{Router, routing::get};

use crate::state::AppState;

pub use auth::{ApiJson, RequireAuth};

/// GET /
async fn root() -> &'static str {
    "EduMate Backend is running!"
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        // Health check
        .merge(health::routes())
        // Accounts
        .merge(users::routes())
        // Posts
        .merge(posts::routes())
        .with_state(state)
}
