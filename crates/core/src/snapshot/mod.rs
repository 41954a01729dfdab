//! Persistence of the currency table through Apache OpenDAL.
//!
//! The whole table is one JSON object under a single key:
//!
//! ```text
//! { "currencies": { "AUD": { "USD": "0.7" }, "USD": { "AUD": "1.428..." } } }
//! ```
//!
//! Backends: in-process memory, local filesystem, or any S3-compatible store.

mod error;
mod service;

pub use error::SnapshotError;
pub use service::SnapshotService;
