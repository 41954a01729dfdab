//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod admin;
pub mod health;
pub mod identity;
pub mod rates;


/// Creates the API router with all routes.
///
/// Admin routes take the session token per request; the gate rejects
/// unknown tokens before touching the store.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(identity::routes())
        .merge(rates::routes())
        .merge(admin::routes())
}
