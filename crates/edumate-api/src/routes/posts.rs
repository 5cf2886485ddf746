//! Post routes

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use edumate_auth::Action;
use edumate_core::{ListParams, PostInput, PostPage, PostPatch};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::{ApiJson, RequireAuth};
use super::types::{MessageResponse, PostResponse};

/// POST /api/posts (roles allowed by the `create_post` policy)
async fn create_post(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<PostInput>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    state.access.check(&user, Action::CreatePost)?;

    let post = state.posts.create(&user, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            message: Some("Post created successfully".to_string()),
            post,
        }),
    ))
}

/// GET /api/posts (any authenticated user)
async fn list_posts(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PostPage>, ApiError> {
    let Query(params) = params?;
    let page = state.posts.list(params).await?;
    Ok(Json(page))
}

/// GET /api/posts/{id} (any authenticated user)
async fn get_post(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    let Path(id) = id?;
    let post = state.posts.get(id).await?;
    Ok(Json(PostResponse {
        message: None,
        post,
    }))
}

/// PUT /api/posts/{id} (author only)
async fn update_post(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    ApiJson(patch): ApiJson<PostPatch>,
) -> Result<Json<PostResponse>, ApiError> {
    let Path(id) = id?;
    debug!("Updating post {} for {}", id, user.username);

    let post = state.posts.update(&user, id, patch).await?;
    Ok(Json(PostResponse {
        message: Some("Post updated successfully".to_string()),
        post,
    }))
}

/// DELETE /api/posts/{id} (author only)
async fn delete_post(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    debug!("Deleting post {} for {}", id, user.username);

    state.posts.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("Post deleted successfully")))
}

/// Create post routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}
