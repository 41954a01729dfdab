//! Token-gated currency and rate administration.
//!
//! Every successful mutation is followed by a snapshot save.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::{AppState, error::error_response, middleware::BearerToken};

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/currencies",
            get(list_currencies).post(add_currency),
        )
        .route("/admin/currencies/{code}", delete(remove_currency))
        .route("/admin/currencies/{code}/conversions", get(conversions_for))
        .route("/admin/rates", get(list_rates).post(add_rate))
        .route(
            "/admin/rates/{from}/{to}",
            delete(remove_rate).put(update_rate),
        )
}

/// Request body for adding a currency.
#[derive(Debug, Deserialize)]
pub struct AddCurrencyRequest {
    /// Currency code, e.g. `AUD`.
    pub code: String,
}

/// Request body for adding a rate.
#[derive(Debug, Deserialize)]
pub struct AddRateRequest {
    /// Source currency.
    pub from: String,
    /// Target currency.
    pub to: String,
    /// Units of `to` per unit of `from`.
    pub rate: Decimal,
}

/// Request body for updating a rate.
#[derive(Debug, Deserialize)]
pub struct UpdateRateRequest {
    /// New rate.
    pub rate: Decimal,
}

/// Saves the snapshot, then returns `ok` or the save failure.
async fn persisted(state: &AppState, ok: Response) -> Response {
    match state.persist().await {
        Ok(()) => ok,
        Err(e) => error_response(e),
    }
}

/// GET `/admin/currencies`
async fn list_currencies(State(state): State<AppState>, token: BearerToken) -> Response {
    match state.gate.list_currencies(token.as_str()) {
        Ok(currencies) => Json(json!({ "currencies": currencies })).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST `/admin/currencies`
async fn add_currency(
    State(state): State<AppState>,
    token: BearerToken,
    Json(payload): Json<AddCurrencyRequest>,
) -> Response {
    if let Err(e) = state.gate.add_currency(token.as_str(), &payload.code) {
        return error_response(e);
    }
    info!(
        user = ?state.sessions.principal_of(token.as_str()),
        code = %payload.code,
        "Currency added via API"
    );
    let ok = (StatusCode::CREATED, Json(json!({ "code": payload.code }))).into_response();
    persisted(&state, ok).await
}

/// DELETE `/admin/currencies/{code}`
async fn remove_currency(
    State(state): State<AppState>,
    token: BearerToken,
    Path(code): Path<String>,
) -> Response {
    if let Err(e) = state.gate.remove_currency(token.as_str(), &code) {
        return error_response(e);
    }
    persisted(&state, StatusCode::NO_CONTENT.into_response()).await
}

/// GET `/admin/currencies/{code}/conversions` - four decimals.
async fn conversions_for(
    State(state): State<AppState>,
    token: BearerToken,
    Path(code): Path<String>,
) -> Response {
    match state.gate.conversions_for(token.as_str(), &code) {
        Ok(rates) => Json(json!({ "code": code, "rates": rates })).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET `/admin/rates` - four decimals.
async fn list_rates(State(state): State<AppState>, token: BearerToken) -> Response {
    match state.gate.list_rates(token.as_str()) {
        Ok(rates) => Json(json!({ "rates": rates })).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST `/admin/rates`
async fn add_rate(
    State(state): State<AppState>,
    token: BearerToken,
    Json(payload): Json<AddRateRequest>,
) -> Response {
    if let Err(e) = state
        .gate
        .add_rate(token.as_str(), &payload.from, &payload.to, payload.rate)
    {
        return error_response(e);
    }
    let ok = (
        StatusCode::CREATED,
        Json(json!({
            "from": payload.from,
            "to": payload.to,
            "rate": payload.rate,
        })),
    )
        .into_response();
    persisted(&state, ok).await
}

/// PUT `/admin/rates/{from}/{to}`
async fn update_rate(
    State(state): State<AppState>,
    token: BearerToken,
    Path((from, to)): Path<(String, String)>,
    Json(payload): Json<UpdateRateRequest>,
) -> Response {
    if let Err(e) = state
        .gate
        .update_rate(token.as_str(), &from, &to, payload.rate)
    {
        return error_response(e);
    }
    let ok = Json(json!({ "from": from, "to": to, "rate": payload.rate })).into_response();
    persisted(&state, ok).await
}

/// DELETE `/admin/rates/{from}/{to}`
async fn remove_rate(
    State(state): State<AppState>,
    token: BearerToken,
    Path((from, to)): Path<(String, String)>,
) -> Response {
    if let Err(e) = state.gate.remove_rate(token.as_str(), &from, &to) {
        return error_response(e);
    }
    persisted(&state, StatusCode::NO_CONTENT.into_response()).await
}
