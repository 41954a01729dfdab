//! Snapshot error types.

use thiserror::Error;

use exrate_shared::AppError;

/// Snapshot persistence errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Storage provider could not be set up.
    #[error("snapshot storage configuration error: {0}")]
    Configuration(String),

    /// Read or write against the backend failed.
    #[error("snapshot storage operation failed: {0}")]
    Operation(String),

    /// Stored bytes are not a valid snapshot.
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
}

impl SnapshotError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<opendal::Error> for SnapshotError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

impl From<SnapshotError> for AppError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Configuration(_) | SnapshotError::Operation(_) => {
                Self::ServiceUnavailable(err.to_string())
            }
            SnapshotError::Corrupt(_) => Self::Internal(err.to_string()),
        }
    }
}
