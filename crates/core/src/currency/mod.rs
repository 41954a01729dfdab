//! Currencies, conversion rates and the table that keeps them symmetric.

pub mod entity;
pub mod error;
pub mod store;

#[cfg(test)]
mod props;

pub use entity::{ADMIN_DECIMALS, PUBLIC_DECIMALS, RateEntity, SERVICE_FEE_MULTIPLIER, format_rate};
pub use error::{RateError, RateErrorKind};
pub use store::{RateStore, StoreSnapshot, SymmetryViolation};
