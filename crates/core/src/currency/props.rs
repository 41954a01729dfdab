//! Property-based tests for the rate store.
//!
//! - Every stored rate has a reciprocal partner after any operation sequence
//! - Failed operations leave the table unchanged
//! - Extreme rates are stored consistently or rejected
//! - Conversion charges exactly the service fee

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entity::SERVICE_FEE_MULTIPLIER;
use super::error::RateError;
use super::store::{RateStore, SYMMETRY_TOLERANCE};

const CODES: [&str; 4] = ["AUD", "USD", "NZD", "GBP"];

/// Positive rates from 0.0001 to 10000.0000.
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Positive rates spanning roughly 1e-20 to 1e20.
fn wide_rate() -> impl Strategy<Value = Decimal> {
    (1i64..10_000, -20i32..=16).prop_map(|(mantissa, exp)| {
        let power = exp.unsigned_abs();
        if exp < 0 {
            Decimal::new(mantissa, power)
        } else {
            Decimal::from(mantissa) * Decimal::from(10i64.pow(power))
        }
    })
}

/// Rates that may be zero or negative.
fn any_rate() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Positive amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn code() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CODES.to_vec())
}

#[derive(Debug, Clone)]
enum Op {
    AddCurrency(&'static str),
    RemoveCurrency(&'static str),
    AddRate(&'static str, &'static str, Decimal),
    UpdateRate(&'static str, &'static str, Decimal),
    RemoveRate(&'static str, &'static str),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        code().prop_map(Op::AddCurrency),
        code().prop_map(Op::RemoveCurrency),
        (code(), code(), any_rate()).prop_map(|(a, b, r)| Op::AddRate(a, b, r)),
        (code(), code(), wide_rate()).prop_map(|(a, b, r)| Op::AddRate(a, b, r)),
        (code(), code(), any_rate()).prop_map(|(a, b, r)| Op::UpdateRate(a, b, r)),
        (code(), code(), wide_rate()).prop_map(|(a, b, r)| Op::UpdateRate(a, b, r)),
        (code(), code()).prop_map(|(a, b)| Op::RemoveRate(a, b)),
    ]
}

fn apply(store: &RateStore, op: &Op) -> bool {
    match op {
        Op::AddCurrency(c) => store.add_currency(c).is_ok(),
        Op::RemoveCurrency(c) => store.remove_currency(c).is_ok(),
        Op::AddRate(a, b, r) => store.add_rate(a, b, *r).is_ok(),
        Op::UpdateRate(a, b, r) => store.update_rate(a, b, *r).is_ok(),
        Op::RemoveRate(a, b) => store.remove_rate(a, b).is_ok(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any sequence of operations keeps every rate paired with its inverse.
    #[test]
    fn prop_operations_preserve_symmetry(ops in prop::collection::vec(op(), 1..60)) {
        let store = RateStore::new();
        for op in &ops {
            apply(&store, op);
            let violations = store.check_consistency();
            prop_assert!(violations.is_empty(), "{:?} after {:?}", violations, op);
        }
    }

    /// A rejected operation does not change the table.
    #[test]
    fn prop_failed_operation_is_noop(ops in prop::collection::vec(op(), 1..60)) {
        let store = RateStore::new();
        for op in &ops {
            let before = store.snapshot();
            if !apply(&store, op) {
                prop_assert_eq!(store.snapshot(), before, "{:?} changed state", op);
            }
        }
    }

    /// The stored inverse multiplies back to one.
    #[test]
    fn prop_inverse_is_reciprocal(rate in positive_rate()) {
        let store = RateStore::new();
        store.add_currency("AUD").unwrap();
        store.add_currency("USD").unwrap();
        store.add_rate("AUD", "USD", rate).unwrap();

        let inverse = store.rate_of("USD", "AUD").unwrap();
        let product = rate * inverse;
        prop_assert!((product - Decimal::ONE).abs() <= SYMMETRY_TOLERANCE);
    }

    /// Extreme rates are either stored as a consistent pair or rejected outright.
    #[test]
    fn prop_wide_rates_accepted_only_when_consistent(rate in wide_rate()) {
        let store = RateStore::new();
        store.add_currency("AUD").unwrap();
        store.add_currency("USD").unwrap();

        match store.add_rate("AUD", "USD", rate) {
            Ok(()) => {
                prop_assert!(store.check_consistency().is_empty());
                prop_assert_eq!(store.rate_of("AUD", "USD").unwrap(), rate);
            }
            Err(err) => {
                prop_assert_eq!(err, RateError::UnrepresentableInverse(rate));
                prop_assert!(store.list_rates(4).is_empty());
            }
        }
    }

    /// Conversion is `amount * rate * 0.99` exactly.
    #[test]
    fn prop_convert_charges_fee(amount in positive_amount(), rate in positive_rate()) {
        let store = RateStore::new();
        store.add_currency("AUD").unwrap();
        store.add_currency("USD").unwrap();
        store.add_rate("AUD", "USD", rate).unwrap();

        let converted = store.convert("AUD", "USD", amount).unwrap();
        prop_assert_eq!(converted, amount * rate * SERVICE_FEE_MULTIPLIER);
        prop_assert!(converted < amount * rate);
    }

    /// Non-positive amounts never convert.
    #[test]
    fn prop_non_positive_amount_rejected(cents in -100_000_000i64..=0) {
        let store = RateStore::with_defaults().unwrap();
        prop_assert!(store.convert("AUD", "USD", Decimal::new(cents, 2)).is_err());
    }
}
