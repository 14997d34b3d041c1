//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis connection settings for the distributed backend
//! - `cleanup` - Periodic expiry sweep schedule
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - IP burst budget and phone backoff tiers
//! - `storage` - Storage backend selection
//! - `verification` - Token validity, tries and phone canonicalization

pub mod cache;
pub mod cleanup;
pub mod environment;
pub mod rate_limit;
pub mod storage;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// Re-export commonly used types
pub use cache::CacheConfig;
pub use cleanup::CleanupConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::RateLimitConfig;
pub use storage::{StorageConfig, StorageKind};
pub use verification::VerificationConfig;

/// Configuration errors detected while loading or validating
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required setting: {field}")]
    Missing { field: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Storage backend selection
    pub storage: StorageConfig,

    /// Redis configuration (used when the storage kind is redis)
    pub cache: CacheConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Token and phone verification configuration
    pub verification: VerificationConfig,

    /// Periodic cleanup configuration
    #[serde(default)]
    pub cleanup: CleanupConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            verification: VerificationConfig::default(),
            cleanup: CleanupConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env();
        let config = Self {
            environment,
            storage: StorageConfig::from_env()?,
            cache: CacheConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
            verification: VerificationConfig::from_env()?,
            cleanup: CleanupConfig::from_env()?,
            logging: LoggingConfig::from_env(environment),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rate_limit.validate()?;
        self.verification.validate()?;
        self.cleanup.validate()?;
        if self.storage.kind == StorageKind::Redis && self.cache.url.is_empty() {
            return Err(ConfigError::Missing {
                field: "REDIS_URL".to_string(),
            });
        }
        Ok(())
    }
}

/// Read an environment variable, parsing it into `T`.
///
/// Unset or empty variables yield `None`; unparseable values are an error
/// rather than a silent fallback.
pub(crate) fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                field: name.to_string(),
                reason: format!("cannot parse '{}'", raw),
            }),
        _ => Ok(None),
    }
}

/// Read a comma separated list from an environment variable
pub(crate) fn env_list(name: &str) -> Option<Vec<String>> {
    std::env::var(name).ok().and_then(|raw| {
        let items: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            None
        } else {
            Some(items)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let mut config = AppConfig::default();
        config.verification.phone_hash_key = "k".repeat(32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_redis_requires_url() {
        let mut config = AppConfig::default();
        config.verification.phone_hash_key = "k".repeat(32);
        config.storage.kind = StorageKind::Redis;
        config.cache.url = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_zero_cleanup_interval_is_rejected() {
        let mut config = AppConfig::default();
        config.verification.phone_hash_key = "k".repeat(32);
        config.cleanup.interval_seconds = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_env_list_parsing() {
        std::env::set_var("SV_TEST_LIST", " NL, BE ,,DE ");
        assert_eq!(
            env_list("SV_TEST_LIST"),
            Some(vec!["NL".to_string(), "BE".to_string(), "DE".to_string()])
        );
        std::env::remove_var("SV_TEST_LIST");
        assert_eq!(env_list("SV_TEST_LIST"), None);
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        std::env::set_var("SV_TEST_NUMBER", "ten");
        assert!(env_parse::<u64>("SV_TEST_NUMBER").is_err());
        std::env::set_var("SV_TEST_NUMBER", "10");
        assert_eq!(env_parse::<u64>("SV_TEST_NUMBER").unwrap(), Some(10));
        std::env::remove_var("SV_TEST_NUMBER");
    }
}
