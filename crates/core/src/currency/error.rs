//! Rate store error types.

use rust_decimal::Decimal;
use thiserror::Error;

use exrate_shared::AppError;

/// Coarse classification of a [`RateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateErrorKind {
    /// Currency or rate entry absent.
    NotFound,
    /// Currency or rate entry already present.
    Conflict,
    /// Non-positive rate or amount, or otherwise unusable input.
    InvalidValue,
}

/// Currency and rate errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    /// Currency not found.
    #[error("Currency '{0}' not found")]
    CurrencyNotFound(String),

    /// Currency already exists.
    #[error("Currency '{0}' already exists")]
    CurrencyExists(String),

    /// No rate from one currency to another.
    #[error("No rate from {from} to {to}")]
    RateNotFound {
        /// Source currency.
        from: String,
        /// Target currency.
        to: String,
    },

    /// Rate between the two currencies already exists.
    #[error("Rate from {from} to {to} already exists")]
    RateExists {
        /// Source currency.
        from: String,
        /// Target currency.
        to: String,
    },

    /// Rate must be positive.
    #[error("Exchange rate must be positive, got {0}")]
    NonPositiveRate(Decimal),

    /// Amount must be positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Currencies must be different.
    #[error("From and to currencies must be different ({0})")]
    SameCurrency(String),

    /// Currency code is empty or whitespace.
    #[error("Currency code must not be blank")]
    BlankCode,

    /// Currency code has leading or trailing whitespace.
    #[error("Currency code '{0}' has surrounding whitespace")]
    UntrimmedCode(String),

    /// Inverse of the rate cannot be represented.
    #[error("Inverse of rate {0} is not representable")]
    UnrepresentableInverse(Decimal),

    /// Conversion result exceeds the decimal range.
    #[error("Conversion result is out of range")]
    Overflow,
}

impl RateError {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub const fn kind(&self) -> RateErrorKind {
        match self {
            Self::CurrencyNotFound(_) | Self::RateNotFound { .. } => RateErrorKind::NotFound,
            Self::CurrencyExists(_) | Self::RateExists { .. } => RateErrorKind::Conflict,
            Self::NonPositiveRate(_)
            | Self::NonPositiveAmount(_)
            | Self::SameCurrency(_)
            | Self::BlankCode
            | Self::UntrimmedCode(_)
            | Self::UnrepresentableInverse(_)
            | Self::Overflow => RateErrorKind::InvalidValue,
        }
    }

    pub(crate) fn rate_not_found(from: &str, to: &str) -> Self {
        Self::RateNotFound {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        match err.kind() {
            RateErrorKind::NotFound => Self::NotFound(err.to_string()),
            RateErrorKind::Conflict => Self::Conflict(err.to_string()),
            RateErrorKind::InvalidValue => Self::Validation(err.to_string()),
        }
    }
}
