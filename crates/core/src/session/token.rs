//! Session token generation.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Source of candidate session tokens.
pub trait TokenGenerator: Send + Sync {
    /// Draws a token of `length` characters. Collisions are handled by the caller.
    fn generate(&self, length: usize) -> String;
}

/// Random `[A-Za-z0-9]` tokens from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphanumericTokens;

impl TokenGenerator for AlphanumericTokens {
    fn generate(&self, length: usize) -> String {
        rand::rng()
            .sample_iter(Alphanumeric)
            .take(length)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphanumeric_tokens() {
        let token = AlphanumericTokens.generate(5);
        assert_eq!(token.len(), 5);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(AlphanumericTokens.generate(0).is_empty());
    }
}
