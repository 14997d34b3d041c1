//! Configuration for the token manager

use sv_shared::VerificationConfig;

/// Configuration for the token manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// How long a code stays valid, in milliseconds
    pub validity_ms: i64,
    /// Wrong guesses tolerated; the next one locks the code
    pub max_tries: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            validity_ms: 30 * 60 * 1_000,
            max_tries: 3,
        }
    }
}

impl TokenConfig {
    pub fn from_config(config: &VerificationConfig) -> Self {
        Self {
            validity_ms: config.token_validity_ms(),
            max_tries: config.max_verify_tries,
        }
    }
}
