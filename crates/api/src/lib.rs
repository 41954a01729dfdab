//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for identity, public rates and rate administration
//! - Bearer token extraction
//! - JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use exrate_core::currency::RateStore;
use exrate_core::gate::AccessGate;
use exrate_core::session::SessionManager;
use exrate_core::snapshot::SnapshotService;
use exrate_shared::AppError;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Token-checked access to the rate store.
    pub gate: AccessGate,
    /// Login sessions.
    pub sessions: Arc<SessionManager>,
    /// Snapshot persistence (optional).
    pub snapshots: Option<Arc<SnapshotService>>,
    persist_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Creates state over a store, a session manager and an optional snapshot backend.
    #[must_use]
    pub fn new(
        store: Arc<RateStore>,
        sessions: Arc<SessionManager>,
        snapshots: Option<Arc<SnapshotService>>,
    ) -> Self {
        Self {
            gate: AccessGate::new(store, Arc::clone(&sessions)),
            sessions,
            snapshots,
            persist_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Writes the current table to the snapshot backend, if one is configured.
    ///
    /// Saves run one at a time and read the table only once they hold the
    /// lock, so the last save to finish carries the latest state.
    ///
    /// # Errors
    ///
    /// `ServiceUnavailable` if the write fails.
    pub async fn persist(&self) -> Result<(), AppError> {
        let Some(snapshots) = &self.snapshots else {
            return Ok(());
        };
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.gate.store().snapshot();
        snapshots.save(&snapshot).await.map_err(|e| {
            error!(error = %e, "Failed to persist snapshot");
            AppError::from(e)
        })
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
