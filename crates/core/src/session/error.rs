//! Session error types.

use thiserror::Error;

use exrate_shared::AppError;

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Username unknown or password mismatched.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token is not live.
    #[error("Session not found")]
    NotFound,

    /// Every drawn token collided with a live one.
    #[error("No unused token found after {attempts} attempts")]
    TokenSpaceExhausted {
        /// Number of draws made.
        attempts: usize,
    },
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidCredentials => Self::InvalidCredentials,
            SessionError::NotFound => Self::NotFound(err.to_string()),
            SessionError::TokenSpaceExhausted { .. } => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_app_error() {
        let err: AppError = SessionError::InvalidCredentials.into();
        assert_eq!(err.status_code(), 401);

        let err: AppError = SessionError::NotFound.into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "Not found: Session not found");

        let err: AppError = SessionError::TokenSpaceExhausted { attempts: 3 }.into();
        assert_eq!(err.status_code(), 500);
    }
}
