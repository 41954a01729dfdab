//! Login sessions and bearer tokens.

mod error;
mod manager;
mod token;

pub use error::SessionError;
pub use manager::{Session, SessionManager};
pub use token::{AlphanumericTokens, TokenGenerator};
