//! Access gate error types.

use thiserror::Error;

use exrate_shared::AppError;

use crate::currency::RateError;

/// Errors from a gated store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Token missing or not live.
    #[error("Session token is not valid")]
    Authentication,

    /// The store rejected the operation.
    #[error(transparent)]
    Rate(#[from] RateError),
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Authentication => Self::Unauthorized(err.to_string()),
            GateError::Rate(rate) => rate.into(),
        }
    }
}
