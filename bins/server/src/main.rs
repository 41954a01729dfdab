//! Exrate API Server
//!
//! Main entry point for the exchange-rate service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exrate_api::{AppState, create_router};
use exrate_core::currency::RateStore;
use exrate_core::session::SessionManager;
use exrate_core::snapshot::SnapshotService;
use exrate_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exrate=debug,tower_http=debug".into()),
        )
        .with(config.logging.json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.logging.json).then(tracing_subscriber::fmt::layer))
        .init();

    let snapshots = Arc::new(
        SnapshotService::from_config(config.snapshot.clone())
            .context("Failed to initialise snapshot storage")?,
    );
    info!(
        provider = snapshots.provider_name(),
        key = snapshots.key(),
        "Snapshot storage configured"
    );

    let store = match snapshots.load().await? {
        Some(snapshot) => RateStore::from_snapshot(snapshot),
        None if config.seed_defaults => {
            let store = RateStore::with_defaults()?;
            snapshots.save(&store.snapshot()).await?;
            info!(currencies = store.len(), "Seeded default currencies");
            store
        }
        None => RateStore::new(),
    };

    for violation in store.check_consistency() {
        warn!(?violation, "Stored rate has no matching inverse");
    }

    let sessions = Arc::new(SessionManager::new(&config.identity));
    let state = AppState::new(Arc::new(store), sessions, Some(snapshots));
    let app = create_router(state);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
