//! Currency table with inverse-rate bookkeeping.
//!
//! Every rate lives twice: `A -> B` on `A` and `B -> A = 1 / rate` on `B`.
//! Each mutation touches both entities under one write lock and either applies
//! both halves or leaves the table as it was.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::entity::RateEntity;
use super::error::RateError;

/// Codes seeded by [`RateStore::with_defaults`].
pub const DEFAULT_CURRENCIES: [&str; 4] = ["AUD", "USD", "NZD", "GBP"];

/// Tolerance for `rate * inverse == 1`.
///
/// Checked both when a rate is written and by [`RateStore::check_consistency`];
/// a rate whose decimal inverse misses it is rejected as unrepresentable.
pub const SYMMETRY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

type EntityMap = BTreeMap<String, RateEntity>;

/// Complete state of a [`RateStore`], suitable for persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Outbound rates keyed by currency code, then by peer code.
    pub currencies: BTreeMap<String, BTreeMap<String, Decimal>>,
}

/// A rate whose inverse entry is absent or inconsistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymmetryViolation {
    /// `from -> to` exists but `to -> from` does not.
    MissingInverse {
        /// Source currency.
        from: String,
        /// Target currency.
        to: String,
    },
    /// Both directions exist but are not reciprocal.
    MismatchedInverse {
        /// Source currency.
        from: String,
        /// Target currency.
        to: String,
        /// Forward rate.
        rate: Decimal,
        /// Stored reverse rate.
        inverse: Decimal,
    },
}

/// Thread-safe currency table.
#[derive(Debug, Default)]
pub struct RateStore {
    entities: RwLock<EntityMap>,
}

impl RateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the default currencies and rates.
    pub fn with_defaults() -> Result<Self, RateError> {
        let store = Self::new();
        for code in DEFAULT_CURRENCIES {
            store.add_currency(code)?;
        }
        store.add_rate("AUD", "USD", Decimal::new(7, 1))?;
        store.add_rate("AUD", "NZD", Decimal::new(109, 2))?;
        store.add_rate("AUD", "GBP", Decimal::new(55, 2))?;
        Ok(store)
    }

    /// Rebuilds a store from a snapshot, exactly as persisted.
    ///
    /// No symmetry repair happens here; call [`RateStore::check_consistency`]
    /// to find one-directional or mismatched entries.
    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let entities = snapshot
            .currencies
            .into_iter()
            .map(|(code, rates)| (code.clone(), RateEntity::with_rates(code, rates)))
            .collect();
        Self {
            entities: RwLock::new(entities),
        }
    }

    /// Exports the complete state.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        let entities = self.read();
        StoreSnapshot {
            currencies: entities
                .iter()
                .map(|(code, entity)| (code.clone(), entity.rates().clone()))
                .collect(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, EntityMap> {
        self.entities.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, EntityMap> {
        self.entities.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the store holds no currencies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns true if `code` is a known currency.
    #[must_use]
    pub fn contains_currency(&self, code: &str) -> bool {
        self.read().contains_key(code)
    }

    /// Adds a currency with no rates.
    pub fn add_currency(&self, code: &str) -> Result<(), RateError> {
        if code.trim().is_empty() {
            return Err(RateError::BlankCode);
        }
        if code.trim() != code {
            return Err(RateError::UntrimmedCode(code.to_string()));
        }
        let mut entities = self.write();
        if entities.contains_key(code) {
            return Err(RateError::CurrencyExists(code.to_string()));
        }
        entities.insert(code.to_string(), RateEntity::new(code));
        info!(currency = %code, "Currency added");
        Ok(())
    }

    /// Removes a currency and every rate pointing at it.
    pub fn remove_currency(&self, code: &str) -> Result<(), RateError> {
        let mut entities = self.write();
        if entities.remove(code).is_none() {
            return Err(RateError::CurrencyNotFound(code.to_string()));
        }
        let mut cascaded = 0usize;
        for entity in entities.values_mut() {
            if entity.drop_rate(code).is_some() {
                cascaded += 1;
            }
        }
        info!(currency = %code, cascaded, "Currency removed");
        Ok(())
    }

    /// Lists all currency codes in ascending order.
    #[must_use]
    pub fn list_currencies(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Adds `from -> to = rate` and `to -> from = 1 / rate`.
    ///
    /// If the reverse half cannot be added, the forward half is withdrawn and
    /// the reverse error returned.
    pub fn add_rate(&self, from: &str, to: &str, rate: Decimal) -> Result<(), RateError> {
        let mut entities = self.write();
        ensure_pair(&entities, from, to)?;
        let inverse = inverse_of(rate)?;

        entity_mut(&mut entities, from)?.add_rate(to, rate)?;
        let reverse = entity_mut(&mut entities, to).and_then(|e| e.add_rate(from, inverse));
        if let Err(err) = reverse {
            if let Ok(forward) = entity_mut(&mut entities, from) {
                forward.drop_rate(to);
            }
            warn!(%from, %to, error = %err, "Inverse rate rejected, forward rate withdrawn");
            return Err(err);
        }

        info!(%from, %to, %rate, %inverse, "Rate added");
        Ok(())
    }

    /// Replaces `from -> to` with `rate` and `to -> from` with `1 / rate`.
    ///
    /// If the reverse half cannot be updated, the forward rate is restored.
    pub fn update_rate(&self, from: &str, to: &str, rate: Decimal) -> Result<(), RateError> {
        let mut entities = self.write();
        ensure_pair(&entities, from, to)?;
        let inverse = inverse_of(rate)?;

        let previous = entity_mut(&mut entities, from)?.update_rate(to, rate)?;
        let reverse = entity_mut(&mut entities, to).and_then(|e| e.update_rate(from, inverse));
        if let Err(err) = reverse {
            if let Ok(forward) = entity_mut(&mut entities, from) {
                forward.restore_rate(to, previous);
            }
            warn!(%from, %to, error = %err, "Inverse rate rejected, forward rate restored");
            return Err(err);
        }

        info!(%from, %to, %rate, %inverse, "Rate updated");
        Ok(())
    }

    /// Removes both directions of a rate.
    ///
    /// Nothing is removed unless both directions exist.
    pub fn remove_rate(&self, from: &str, to: &str) -> Result<(), RateError> {
        let mut entities = self.write();
        let forward = entities
            .get(from)
            .ok_or_else(|| RateError::CurrencyNotFound(from.to_string()))?;
        let reverse = entities
            .get(to)
            .ok_or_else(|| RateError::CurrencyNotFound(to.to_string()))?;
        if !forward.contains_rate(to) {
            return Err(RateError::rate_not_found(from, to));
        }
        if !reverse.contains_rate(from) {
            warn!(%from, %to, "Reverse rate missing, nothing removed");
            return Err(RateError::rate_not_found(to, from));
        }

        entity_mut(&mut entities, from)?.drop_rate(to);
        entity_mut(&mut entities, to)?.drop_rate(from);
        info!(%from, %to, "Rate removed");
        Ok(())
    }

    /// Returns the rate from `from` to `to`.
    ///
    /// `to` only has to be a rate key of `from`, not a currency in the store.
    pub fn rate_of(&self, from: &str, to: &str) -> Result<Decimal, RateError> {
        let entities = self.read();
        let entity = entities
            .get(from)
            .ok_or_else(|| RateError::CurrencyNotFound(from.to_string()))?;
        entity.rate_of(to)
    }

    /// Converts `amount` of `from` into `to`, service fee included.
    pub fn convert(&self, from: &str, to: &str, amount: Decimal) -> Result<Decimal, RateError> {
        let entities = self.read();
        let entity = entities
            .get(from)
            .ok_or_else(|| RateError::CurrencyNotFound(from.to_string()))?;
        let converted = entity.convert(to, amount)?;
        debug!(%from, %to, %amount, %converted, "Converted amount");
        Ok(converted)
    }

    /// Lists every rate of every currency, ordered by currency then peer.
    #[must_use]
    pub fn list_rates(&self, decimals: u32) -> Vec<String> {
        self.read()
            .values()
            .filter(|entity| entity.is_tradeable())
            .flat_map(|entity| entity.list_rates(decimals))
            .collect()
    }

    /// Lists the rates of a single currency.
    pub fn conversions_for(&self, code: &str, decimals: u32) -> Result<Vec<String>, RateError> {
        let entities = self.read();
        let entity = entities
            .get(code)
            .ok_or_else(|| RateError::CurrencyNotFound(code.to_string()))?;
        Ok(entity.list_rates(decimals).collect())
    }

    /// Finds rates whose inverse is missing or not reciprocal.
    #[must_use]
    pub fn check_consistency(&self) -> Vec<SymmetryViolation> {
        let entities = self.read();
        let mut violations = Vec::new();
        for (from, entity) in entities.iter() {
            for (to, rate) in entity.rates() {
                if from == to {
                    continue;
                }
                let inverse = entities.get(to).and_then(|peer| peer.rates().get(from));
                match inverse {
                    None => violations.push(SymmetryViolation::MissingInverse {
                        from: from.clone(),
                        to: to.clone(),
                    }),
                    Some(inverse) if !is_reciprocal(*rate, *inverse) => {
                        violations.push(SymmetryViolation::MismatchedInverse {
                            from: from.clone(),
                            to: to.clone(),
                            rate: *rate,
                            inverse: *inverse,
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        violations
    }
}

fn ensure_pair(entities: &EntityMap, from: &str, to: &str) -> Result<(), RateError> {
    if from == to {
        return Err(RateError::SameCurrency(from.to_string()));
    }
    for code in [from, to] {
        if !entities.contains_key(code) {
            return Err(RateError::CurrencyNotFound(code.to_string()));
        }
    }
    Ok(())
}

fn entity_mut<'a>(entities: &'a mut EntityMap, code: &str) -> Result<&'a mut RateEntity, RateError> {
    entities
        .get_mut(code)
        .ok_or_else(|| RateError::CurrencyNotFound(code.to_string()))
}

/// Returns `1 / rate`, rejecting non-positive rates and inverses that do not
/// multiply back to one within [`SYMMETRY_TOLERANCE`].
fn inverse_of(rate: Decimal) -> Result<Decimal, RateError> {
    if rate <= Decimal::ZERO {
        return Err(RateError::NonPositiveRate(rate));
    }
    Decimal::ONE
        .checked_div(rate)
        .filter(|inverse| *inverse > Decimal::ZERO && is_reciprocal(rate, *inverse))
        .ok_or(RateError::UnrepresentableInverse(rate))
}

fn is_reciprocal(rate: Decimal, inverse: Decimal) -> bool {
    rate.checked_mul(inverse)
        .is_some_and(|product| (product - Decimal::ONE).abs() <= SYMMETRY_TOLERANCE)
}
