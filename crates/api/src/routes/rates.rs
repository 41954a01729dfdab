//! Public rate lookup and conversion.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppState, error::error_response};

/// Creates the public rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rates", get(list_rates))
        .route("/rates/{from}/{to}", get(rate_of))
        .route("/rates/{from}/{to}/convert", get(convert))
}

/// A single rate.
#[derive(Debug, Serialize)]
pub struct RateResponse {
    /// Source currency.
    pub from: String,
    /// Target currency.
    pub to: String,
    /// Units of `to` per unit of `from`.
    pub rate: Decimal,
}

/// Query parameters for a conversion.
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    /// Amount of the source currency.
    pub amount: Decimal,
}

/// Conversion result.
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    /// Source currency.
    pub from: String,
    /// Target currency.
    pub to: String,
    /// Amount converted.
    pub amount: Decimal,
    /// Amount received after the service fee.
    pub converted: Decimal,
}

/// GET `/rates` - every rate, two decimals.
async fn list_rates(State(state): State<AppState>) -> Response {
    Json(json!({ "rates": state.gate.public_rates() })).into_response()
}

/// GET `/rates/{from}/{to}`
async fn rate_of(State(state): State<AppState>, Path((from, to)): Path<(String, String)>) -> Response {
    match state.gate.rate_of(&from, &to) {
        Ok(rate) => Json(RateResponse { from, to, rate }).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET `/rates/{from}/{to}/convert?amount=`
async fn convert(
    State(state): State<AppState>,
    Path((from, to)): Path<(String, String)>,
    Query(query): Query<ConvertQuery>,
) -> Response {
    match state.gate.convert(&from, &to, query.amount) {
        Ok(converted) => Json(ConvertResponse {
            from,
            to,
            amount: query.amount,
            converted,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}
