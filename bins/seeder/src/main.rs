//! Seeds the snapshot store with the default currency table.
//!
//! Writes AUD, USD, NZD and GBP with their AUD rates and inverses to the
//! snapshot backend named in the configuration. An existing snapshot is left
//! alone unless `--force` is given.
//!
//! Usage: cargo run --bin seeder [-- --force]

use anyhow::Context;

use exrate_core::currency::{ADMIN_DECIMALS, RateStore};
use exrate_core::snapshot::SnapshotService;
use exrate_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let force = std::env::args().any(|arg| arg == "--force");
    let config = AppConfig::load().context("Failed to load configuration")?;
    let snapshots = SnapshotService::from_config(config.snapshot)?;

    println!(
        "Using {} snapshot store, key {}",
        snapshots.provider_name(),
        snapshots.key()
    );

    if !force && snapshots.load().await?.is_some() {
        println!("  Snapshot already exists, skipping (use --force to overwrite)");
        return Ok(());
    }

    let store = RateStore::with_defaults()?;
    snapshots.save(&store.snapshot()).await?;

    for line in store.list_rates(ADMIN_DECIMALS) {
        println!("  {line}");
    }
    println!("Seeding complete!");
    Ok(())
}
