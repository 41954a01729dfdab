//! Core domain logic for Exrate.
//!
//! This crate has no web dependencies. It owns the currency table and its
//! invariants, login sessions, token-gated access and snapshot persistence.
//!
//! # Modules
//!
//! - `currency` - Currencies, rates and the inverse-symmetric rate store
//! - `session` - Login sessions and bearer tokens
//! - `gate` - Token-checked access to the rate store
//! - `snapshot` - Loading and saving the table through OpenDAL

pub mod currency;
pub mod gate;
pub mod session;
pub mod snapshot;
