//! Bearer token extraction for session routes.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    response::Response,
};

use exrate_shared::AppError;

use crate::error::error_response;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Returns the bearer token carried by `headers`, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
}

/// Session token taken from `Authorization: Bearer <token>`.
///
/// Only presence is checked here. Whether the token is live is decided by the
/// access gate or the session manager.
///
/// ```ignore
/// async fn handler(State(state): State<AppState>, token: BearerToken) -> Response {
///     match state.gate.list_currencies(token.as_str()) { /* ... */ }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)
            .map(|token| Self(token.to_string()))
            .ok_or_else(|| {
                error_response(AppError::Unauthorized(
                    "Authorization header with Bearer token is required".into(),
                ))
            })
    }
}
