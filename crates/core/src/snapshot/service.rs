//! Snapshot service implementation using Apache OpenDAL.

use opendal::{ErrorKind, Operator, services};
use tracing::{debug, info};

use exrate_shared::config::{SnapshotConfig, SnapshotProvider};

use super::error::SnapshotError;
use crate::currency::StoreSnapshot;

/// Loads and saves the currency table.
#[derive(Debug, Clone)]
pub struct SnapshotService {
    operator: Operator,
    config: SnapshotConfig,
}

impl SnapshotService {
    /// Create a snapshot service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: SnapshotConfig) -> Result<Self, SnapshotError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    fn create_operator(provider: &SnapshotProvider) -> Result<Operator, SnapshotError> {
        let operator = match provider {
            SnapshotProvider::Memory => Operator::new(services::Memory::default())?.finish(),
            SnapshotProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| SnapshotError::configuration("invalid path"))?;
                Operator::new(services::Fs::default().root(root))?.finish()
            }
            SnapshotProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder)?.finish()
            }
        };
        Ok(operator)
    }

    /// Read the stored snapshot.
    ///
    /// Returns `None` if nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// `Operation` if the backend fails, `Corrupt` if the stored bytes do not parse.
    pub async fn load(&self) -> Result<Option<StoreSnapshot>, SnapshotError> {
        let buffer = match self.operator.read(&self.config.key).await {
            Ok(buffer) => buffer,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key = %self.config.key, "No snapshot stored yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: StoreSnapshot = serde_json::from_slice(&buffer.to_vec())
            .map_err(|e| SnapshotError::Corrupt(e.to_string()))?;
        info!(
            key = %self.config.key,
            currencies = snapshot.currencies.len(),
            "Snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    /// Overwrite the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the write fails.
    pub async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| SnapshotError::Operation(e.to_string()))?;
        let size = bytes.len();
        self.operator.write(&self.config.key, bytes).await?;
        debug!(key = %self.config.key, size, "Snapshot saved");
        Ok(())
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the object key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.config.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::RateStore;
    use rust_decimal_macros::dec;

    fn memory_service() -> SnapshotService {
        SnapshotService::from_config(SnapshotConfig::new(SnapshotProvider::Memory))
            .expect("memory operator")
    }

    #[tokio::test]
    async fn test_load_missing_returns_none() {
        let service = memory_service();
        assert_eq!(service.provider_name(), "memory");
        assert!(service.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let service = memory_service();
        let store = RateStore::with_defaults().unwrap();

        service.save(&store.snapshot()).await.unwrap();
        let loaded = service.load().await.unwrap().expect("snapshot present");

        assert_eq!(loaded, store.snapshot());
        assert_eq!(loaded.currencies["AUD"]["USD"], dec!(0.7));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let service = memory_service();
        let store = RateStore::with_defaults().unwrap();
        service.save(&store.snapshot()).await.unwrap();

        store.remove_currency("GBP").unwrap();
        service.save(&store.snapshot()).await.unwrap();

        let loaded = service.load().await.unwrap().unwrap();
        assert!(!loaded.currencies.contains_key("GBP"));
        assert!(!loaded.currencies["AUD"].contains_key("GBP"));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot() {
        let service = memory_service();
        service
            .operator
            .write(service.key(), b"not json".to_vec())
            .await
            .unwrap();

        let err = service.load().await.unwrap_err();
        assert!(matches!(err, SnapshotError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_local_fs_round_trip() {
        let root = std::env::temp_dir().join(format!("exrate-snapshot-{}", std::process::id()));
        let config =
            SnapshotConfig::new(SnapshotProvider::local_fs(&root)).with_key("test/rates.json");
        let service = SnapshotService::from_config(config).unwrap();
        assert_eq!(service.provider_name(), "local");

        let store = RateStore::with_defaults().unwrap();
        service.save(&store.snapshot()).await.unwrap();
        let loaded = service.load().await.unwrap().unwrap();
        assert_eq!(loaded, store.snapshot());

        let _ = std::fs::remove_dir_all(root);
    }
}
