//! Account routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use edumate_auth::Action;
use edumate_core::{CoreError, Registration, Session};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::{ApiJson, RequireAuth};
use super::types::{LoginRequest, MessageResponse, UserResponse};

/// POST /api/users/register
async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<Registration>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session = state.accounts.register(request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/users/login
async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<Session>, ApiError> {
    let (Some(login), Some(password)) = (request.username_or_email, request.password) else {
        return Err(CoreError::Validation(
            "Username or email and password are required".to_string(),
        )
        .into());
    };

    let session = state.accounts.login(&login, &password).await?;
    Ok(Json(session))
}

/// GET /api/users/me
async fn me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!("Profile requested by {}", user.username);
    let profile = state.accounts.profile(user.id).await?;
    Ok(Json(UserResponse { user: profile }))
}

/// GET /api/users/society
async fn society(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.access.check(&user, Action::SocietyLounge)?;
    Ok(Json(MessageResponse::new(
        "Welcome Society Head! You have special access.",
    )))
}

/// Create account routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/users/me", get(me))
        .route("/api/users/society", get(society))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use edumate_db::UserRole;
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_register_login_and_me() {
        let app = TestApp::new().await;
        let token = app.register("ada").await;

        let (status, json) = app.send("GET", "/api/users/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"]["username"], "ada");
        assert_eq!(json["user"]["role"], "member");
        assert!(json["user"].get("passwordHash").is_none());

        for credential in [
            json!({"usernameOrEmail": "ada", "password": "correct-horse"}),
            json!({"email": "ADA@campus.edu", "password": "correct-horse"}),
            json!({"username": "ada", "password": "correct-horse"}),
        ] {
            let (status, json) = app.send("POST", "/api/users/login", None, Some(credential)).await;
            assert_eq!(status, StatusCode::OK);
            assert!(json["token"].is_string());
            assert_eq!(json["user"]["email"], "ada@campus.edu");
        }
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let app = TestApp::new().await;
        app.register("ada").await;

        let duplicate = json!({
            "username": "ada2",
            "email": "ada@campus.edu",
            "password": "correct-horse",
            "firstName": "Ada",
            "lastName": "L",
        });
        let (status, json) = app.send("POST", "/api/users/register", None, Some(duplicate)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "CONFLICT");

        let missing = json!({"username": "grace", "password": "correct-horse"});
        let (status, json) = app.send("POST", "/api/users/register", None, Some(missing)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_register_ignores_requested_role() {
        let app = TestApp::new().await;
        let body = json!({
            "username": "sneaky",
            "email": "sneaky@campus.edu",
            "password": "correct-horse",
            "firstName": "Sne",
            "lastName": "Aky",
            "role": "society_head",
        });
        let (status, json) = app.send("POST", "/api/users/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["user"]["role"], "member");

        let token = json["token"].as_str().unwrap();
        let (status, _) = app.send("GET", "/api/users/society", Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let app = TestApp::new().await;
        app.register("ada").await;

        let (status, _) = app
            .send("POST", "/api/users/login", None, Some(json!({"password": "x"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let wrong = json!({"usernameOrEmail": "ada", "password": "wrong-horse"});
        let (status, wrong_body) = app.send("POST", "/api/users/login", None, Some(wrong)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let unknown = json!({"usernameOrEmail": "nobody", "password": "wrong-horse"});
        let (status, unknown_body) = app.send("POST", "/api/users/login", None, Some(unknown)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_body, unknown_body);
    }

    #[tokio::test]
    async fn test_me_requires_valid_token() {
        let app = TestApp::new().await;

        let (status, json) = app.send("GET", "/api/users/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "No token provided");

        let (status, _) = app.send("GET", "/api/users/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (id, fresh) = app.society_head("chess_club").await;
        let expired = app.expired_token(id, UserRole::SocietyHead);
        let (status, json) = app.send("GET", "/api/users/me", Some(&expired), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "INVALID_TOKEN");

        let (status, json) = app.send("GET", "/api/users/me", Some(&fresh), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"]["id"], id);
    }

    #[tokio::test]
    async fn test_society_lounge_is_role_gated() {
        let app = TestApp::new().await;
        let member = app.register("ada").await;
        let (_, head) = app.society_head("chess_club").await;

        let (status, _) = app.send("GET", "/api/users/society", Some(&member), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, json) = app.send("GET", "/api/users/society", Some(&head), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Welcome Society Head! You have special access.");
    }
}
