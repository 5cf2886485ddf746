//! Request extractors

use axum::{
    extract::{FromRef, FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use edumate_auth::{AuthError, AuthUser, extract_bearer_token};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body whose rejections use the API error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Extractor for authenticated user (required)
///
/// Verifies the bearer token and loads the user it names, so the role seen
/// by handlers is the stored one.
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingAuthHeader)?;

        let token = extract_bearer_token(auth_header)?;
        let user = app_state.accounts.authenticate(token).await?;

        debug!("Authenticated user: {} ({})", user.username, user.role.as_str());
        Ok(RequireAuth(user))
    }
}
