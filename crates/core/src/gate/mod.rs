//! Token-gated access to the rate store.

mod error;

pub use error::GateError;

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use crate::currency::{ADMIN_DECIMALS, PUBLIC_DECIMALS, RateError, RateStore};
use crate::session::SessionManager;

/// Checks the session token before every administrative store operation.
///
/// Lookups and conversions stay public.
#[derive(Debug, Clone)]
pub struct AccessGate {
    store: Arc<RateStore>,
    sessions: Arc<SessionManager>,
}

impl AccessGate {
    /// Creates a gate over a shared store and session manager.
    #[must_use]
    pub const fn new(store: Arc<RateStore>, sessions: Arc<SessionManager>) -> Self {
        Self { store, sessions }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &RateStore {
        &self.store
    }

    fn check(&self, token: &str) -> Result<(), GateError> {
        if self.sessions.authorise(token) {
            Ok(())
        } else {
            warn!("Rejected request with unknown session token");
            Err(GateError::Authentication)
        }
    }

    /// Adds a currency.
    pub fn add_currency(&self, token: &str, code: &str) -> Result<(), GateError> {
        self.check(token)?;
        Ok(self.store.add_currency(code)?)
    }

    /// Removes a currency and every rate pointing at it.
    pub fn remove_currency(&self, token: &str, code: &str) -> Result<(), GateError> {
        self.check(token)?;
        Ok(self.store.remove_currency(code)?)
    }

    /// Lists currency codes.
    pub fn list_currencies(&self, token: &str) -> Result<Vec<String>, GateError> {
        self.check(token)?;
        Ok(self.store.list_currencies())
    }

    /// Adds a rate and its inverse.
    pub fn add_rate(&self, token: &str, from: &str, to: &str, rate: Decimal) -> Result<(), GateError> {
        self.check(token)?;
        Ok(self.store.add_rate(from, to, rate)?)
    }

    /// Updates a rate and its inverse.
    pub fn update_rate(&self, token: &str, from: &str, to: &str, rate: Decimal) -> Result<(), GateError> {
        self.check(token)?;
        Ok(self.store.update_rate(from, to, rate)?)
    }

    /// Removes a rate and its inverse.
    pub fn remove_rate(&self, token: &str, from: &str, to: &str) -> Result<(), GateError> {
        self.check(token)?;
        Ok(self.store.remove_rate(from, to)?)
    }

    /// Lists one currency's rates to four decimals.
    pub fn conversions_for(&self, token: &str, code: &str) -> Result<Vec<String>, GateError> {
        self.check(token)?;
        Ok(self.store.conversions_for(code, ADMIN_DECIMALS)?)
    }

    /// Lists every rate to four decimals.
    pub fn list_rates(&self, token: &str) -> Result<Vec<String>, GateError> {
        self.check(token)?;
        Ok(self.store.list_rates(ADMIN_DECIMALS))
    }

    /// Lists every rate to two decimals. No token needed.
    #[must_use]
    pub fn public_rates(&self) -> Vec<String> {
        self.store.list_rates(PUBLIC_DECIMALS)
    }

    /// Looks up a rate. No token needed.
    pub fn rate_of(&self, from: &str, to: &str) -> Result<Decimal, RateError> {
        self.store.rate_of(from, to)
    }

    /// Converts an amount with the service fee. No token needed.
    pub fn convert(&self, from: &str, to: &str, amount: Decimal) -> Result<Decimal, RateError> {
        self.store.convert(from, to, amount)
    }
}
