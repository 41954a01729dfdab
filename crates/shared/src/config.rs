//! Application configuration management.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Identity (login/session) configuration.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Snapshot persistence configuration.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    /// Seed the default currencies when no snapshot exists yet.
    #[serde(default = "default_seed_defaults")]
    pub seed_defaults: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            identity: IdentityConfig::default(),
            snapshot: SnapshotConfig::default(),
            seed_defaults: default_seed_defaults(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_seed_defaults() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Length of issued session tokens.
    #[serde(default = "default_token_length")]
    pub token_length: usize,
    /// Draws allowed before token generation gives up.
    #[serde(default = "default_max_token_attempts")]
    pub max_token_attempts: usize,
    /// Accounts allowed to log in.
    #[serde(default = "default_users")]
    pub users: Vec<UserCredential>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_length: default_token_length(),
            max_token_attempts: default_max_token_attempts(),
            users: default_users(),
        }
    }
}

/// A username/password pair.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCredential {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

impl UserCredential {
    /// Creates a new credential.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

fn default_token_length() -> usize {
    5
}

fn default_max_token_attempts() -> usize {
    1000
}

fn default_users() -> Vec<UserCredential> {
    vec![
        UserCredential::new("hayden", "1234"),
        UserCredential::new("josh", "4321"),
    ]
}

/// Object store backing the rate snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotProvider {
    /// In-process memory; state is lost on exit.
    Memory,
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
}

impl SnapshotProvider {
    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::LocalFs { .. } => "local",
            Self::S3 { .. } => "s3",
        }
    }
}

/// Snapshot persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    /// Storage provider configuration.
    #[serde(default = "default_provider")]
    pub provider: SnapshotProvider,
    /// Object key the snapshot is stored under.
    #[serde(default = "default_snapshot_key")]
    pub key: String,
}

impl SnapshotConfig {
    /// Default object key.
    pub const DEFAULT_KEY: &'static str = "currencies.json";

    /// Create a snapshot config using the default key.
    #[must_use]
    pub fn new(provider: SnapshotProvider) -> Self {
        Self {
            provider,
            key: Self::DEFAULT_KEY.to_string(),
        }
    }

    /// Set the object key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self::new(default_provider())
    }
}

fn default_provider() -> SnapshotProvider {
    SnapshotProvider::local_fs("./data")
}

fn default_snapshot_key() -> String {
    SnapshotConfig::DEFAULT_KEY.to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("EXRATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Returns the `host:port` pair to bind.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.identity.token_length, 5);
        assert_eq!(config.identity.max_token_attempts, 1000);
        assert_eq!(config.identity.users.len(), 2);
        assert_eq!(config.snapshot.key, "currencies.json");
        assert_eq!(config.snapshot.provider.name(), "local");
        assert!(!config.logging.json);
        assert!(config.seed_defaults);
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        temp_env::with_vars_unset(["EXRATE__SERVER__PORT", "RUN_MODE"], || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.server.port, 8080);
            assert!(config.seed_defaults);
        });
    }

    #[test]
    fn test_env_overrides_port() {
        temp_env::with_var("EXRATE__SERVER__PORT", Some("9191"), || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.server.port, 9191);
            assert_eq!(config.listen_addr(), "0.0.0.0:9191");
        });
    }

    #[test]
    fn test_snapshot_provider_deserializes_tagged() {
        let provider = provider_from_toml("type = \"local_fs\"\nroot = \"/tmp/rates\"");
        assert_eq!(provider.name(), "local");

        let provider = provider_from_toml("type = \"memory\"");
        assert_eq!(provider.name(), "memory");
    }

    fn provider_from_toml(source: &str) -> SnapshotProvider {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
