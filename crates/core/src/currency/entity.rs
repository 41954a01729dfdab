//! A single currency and its outbound conversion rates.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::RateError;

/// Multiplier applied to every conversion: a fixed 1% service fee.
pub const SERVICE_FEE_MULTIPLIER: Decimal = Decimal::from_parts(99, 0, 0, false, 2);

/// Decimal places used by the admin rate listings.
pub const ADMIN_DECIMALS: u32 = 4;

/// Decimal places used by the public rate listing.
pub const PUBLIC_DECIMALS: u32 = 2;

/// One currency's outbound conversion rates.
///
/// The currency is tradeable exactly when it has at least one rate; the flag is
/// derived from the rate table and cannot be set independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateEntity {
    code: String,
    rates: BTreeMap<String, Decimal>,
}

impl RateEntity {
    /// Creates a currency with no rates.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            rates: BTreeMap::new(),
        }
    }

    pub(crate) fn with_rates(code: impl Into<String>, rates: BTreeMap<String, Decimal>) -> Self {
        Self {
            code: code.into(),
            rates,
        }
    }

    /// Returns the currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the outbound rates keyed by peer code.
    #[must_use]
    pub const fn rates(&self) -> &BTreeMap<String, Decimal> {
        &self.rates
    }

    /// Returns true if the currency has at least one rate.
    #[must_use]
    pub fn is_tradeable(&self) -> bool {
        !self.rates.is_empty()
    }

    /// Returns true if a rate to `peer` exists.
    #[must_use]
    pub fn contains_rate(&self, peer: &str) -> bool {
        self.rates.contains_key(peer)
    }

    /// Adds a rate to `peer`.
    ///
    /// # Errors
    ///
    /// `NonPositiveRate` if `rate <= 0`, `RateExists` if a rate to `peer` is
    /// already present.
    pub fn add_rate(&mut self, peer: &str, rate: Decimal) -> Result<(), RateError> {
        if rate <= Decimal::ZERO {
            return Err(RateError::NonPositiveRate(rate));
        }
        if self.rates.contains_key(peer) {
            return Err(RateError::RateExists {
                from: self.code.clone(),
                to: peer.to_string(),
            });
        }
        self.rates.insert(peer.to_string(), rate);
        Ok(())
    }

    /// Replaces the rate to `peer`, returning the previous rate.
    ///
    /// # Errors
    ///
    /// `NonPositiveRate` if `new_rate <= 0`, `RateNotFound` if there is no
    /// rate to `peer`.
    pub fn update_rate(&mut self, peer: &str, new_rate: Decimal) -> Result<Decimal, RateError> {
        if new_rate <= Decimal::ZERO {
            return Err(RateError::NonPositiveRate(new_rate));
        }
        let slot = self
            .rates
            .get_mut(peer)
            .ok_or_else(|| RateError::rate_not_found(&self.code, peer))?;
        Ok(std::mem::replace(slot, new_rate))
    }

    /// Removes the rate to `peer`, returning it.
    ///
    /// # Errors
    ///
    /// `RateNotFound` if there is no rate to `peer`.
    pub fn remove_rate(&mut self, peer: &str) -> Result<Decimal, RateError> {
        self.rates
            .remove(peer)
            .ok_or_else(|| RateError::rate_not_found(&self.code, peer))
    }

    /// Returns the rate to `peer`.
    ///
    /// # Errors
    ///
    /// `RateNotFound` if there is no rate to `peer`.
    pub fn rate_of(&self, peer: &str) -> Result<Decimal, RateError> {
        self.rates
            .get(peer)
            .copied()
            .ok_or_else(|| RateError::rate_not_found(&self.code, peer))
    }

    /// Converts `amount` into `peer`, charging the service fee.
    ///
    /// The result is `amount * rate * 0.99`, unrounded.
    ///
    /// # Errors
    ///
    /// `NonPositiveAmount` if `amount <= 0`, `RateNotFound` if there is no
    /// rate to `peer`, `Overflow` if the product leaves the decimal range.
    pub fn convert(&self, peer: &str, amount: Decimal) -> Result<Decimal, RateError> {
        if amount <= Decimal::ZERO {
            return Err(RateError::NonPositiveAmount(amount));
        }
        let rate = self.rate_of(peer)?;
        amount
            .checked_mul(rate)
            .and_then(|gross| gross.checked_mul(SERVICE_FEE_MULTIPLIER))
            .ok_or(RateError::Overflow)
    }

    /// Lists the rates as `"CODE-PEER:rate"` strings.
    ///
    /// The iterator is computed on each call and yields nothing for a
    /// currency that is not tradeable.
    pub fn list_rates(&self, decimals: u32) -> impl Iterator<Item = String> + '_ {
        self.rates
            .iter()
            .map(move |(peer, rate)| format_rate(&self.code, peer, *rate, decimals))
    }

    // Infallible variants used by the store to undo a half-applied mutation.

    pub(crate) fn drop_rate(&mut self, peer: &str) -> Option<Decimal> {
        self.rates.remove(peer)
    }

    pub(crate) fn restore_rate(&mut self, peer: &str, rate: Decimal) {
        self.rates.insert(peer.to_string(), rate);
    }
}

/// Formats one rate list item, rounding half away from zero.
#[must_use]
pub fn format_rate(from: &str, to: &str, rate: Decimal, decimals: u32) -> String {
    let rounded = rate.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let precision = usize::try_from(decimals).unwrap_or(usize::MAX);
    format!("{from}-{to}:{rounded:.precision$}")
}
