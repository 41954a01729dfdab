//! Login, logout and token checks.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    error::error_response,
    middleware::{BearerToken, auth::bearer_token},
};

/// Creates the identity routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/identity/login", post(login))
        .route("/identity/logout", post(logout))
        .route("/identity/authorise", get(authorise))
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token for `Authorization: Bearer`.
    pub token: String,
}

/// Logout response.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Always true on success.
    pub logged_out: bool,
    /// User whose session ended.
    pub username: String,
}

/// Token check response.
#[derive(Debug, Serialize)]
pub struct AuthoriseResponse {
    /// Whether the bearer token is live.
    pub authorised: bool,
}

/// POST `/identity/login`
async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> Response {
    match state.sessions.login(&payload.username, &payload.password) {
        Ok(token) => (StatusCode::OK, Json(LoginResponse { token })).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST `/identity/logout`
async fn logout(State(state): State<AppState>, token: BearerToken) -> Response {
    match state.sessions.logout(token.as_str()) {
        Ok(username) => Json(LogoutResponse {
            logged_out: true,
            username,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// GET `/identity/authorise` - never fails; a missing header is simply not authorised.
async fn authorise(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthoriseResponse> {
    let authorised = bearer_token(&headers).is_some_and(|token| state.sessions.authorise(token));
    Json(AuthoriseResponse { authorised })
}
