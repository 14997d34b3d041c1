//! Cache configuration module

use serde::{Deserialize, Serialize};

use super::{env_parse, ConfigError};

/// Redis configuration for the distributed storage backend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    pub url: String,

    /// Prefix for every key written by this component (`<prefix>:<namespace>:<key>:`)
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Connection timeout in milliseconds
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// Response timeout for a single round trip in milliseconds
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// How many times an aborted WATCH/MULTI/EXEC is retried before giving up
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    /// Upper bound on dedicated connections used for WATCH/MULTI/EXEC
    #[serde(default = "default_transaction_pool_size")]
    pub transaction_pool_size: usize,

    /// Retry attempts for transient connection errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (doubled per attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// COUNT hint passed to SCAN during expiry sweeps
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            key_prefix: default_key_prefix(),
            connection_timeout_ms: default_connection_timeout_ms(),
            response_timeout_ms: default_response_timeout_ms(),
            max_conflict_retries: default_max_conflict_retries(),
            transaction_pool_size: default_transaction_pool_size(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            scan_batch_size: default_scan_batch_size(),
        }
    }
}

impl CacheConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            url: env_parse("REDIS_URL")?.unwrap_or(defaults.url),
            key_prefix: env_parse("REDIS_KEY_PREFIX")?.unwrap_or(defaults.key_prefix),
            connection_timeout_ms: env_parse("REDIS_CONNECTION_TIMEOUT_MS")?
                .unwrap_or(defaults.connection_timeout_ms),
            response_timeout_ms: env_parse("REDIS_RESPONSE_TIMEOUT_MS")?
                .unwrap_or(defaults.response_timeout_ms),
            max_conflict_retries: env_parse("REDIS_MAX_CONFLICT_RETRIES")?
                .unwrap_or(defaults.max_conflict_retries),
            transaction_pool_size: env_parse("REDIS_TRANSACTION_POOL_SIZE")?
                .unwrap_or(defaults.transaction_pool_size),
            ..defaults
        })
    }

    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the key prefix for all cache keys
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Namespace part of a key: `<prefix>:<namespace>:`
    pub fn namespace(&self, namespace: &str) -> String {
        format!("{}:{}:", self.key_prefix, namespace)
    }

    /// Composite key for a record: `<prefix>:<namespace>:<key>:`
    pub fn make_key(&self, namespace: &str, key: &str) -> String {
        format!("{}{}:", self.namespace(namespace), key)
    }

    /// SCAN pattern matching every key in a namespace
    pub fn namespace_pattern(&self, namespace: &str) -> String {
        format!("{}*", self.namespace(namespace))
    }
}

fn default_key_prefix() -> String {
    String::from("sms-issuer")
}

fn default_connection_timeout_ms() -> u64 {
    5_000
}

fn default_response_timeout_ms() -> u64 {
    2_000
}

fn default_max_conflict_retries() -> u32 {
    3
}

fn default_transaction_pool_size() -> usize {
    16
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_scan_batch_size() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let config = CacheConfig::default().with_prefix("sms");
        assert_eq!(config.namespace("request"), "sms:request:");
        assert_eq!(config.make_key("request", "abc"), "sms:request:abc:");
        assert_eq!(config.namespace_pattern("ip-limits"), "sms:ip-limits:*");
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"url": "redis://cache:6379", "key_prefix": "sms"}"#).unwrap();
        assert_eq!(config.key_prefix, "sms");
        assert_eq!(config.response_timeout_ms, 2_000);
        assert_eq!(config.scan_batch_size, 100);
        assert_eq!(config.transaction_pool_size, 16);
    }

    #[test]
    fn test_defaults() {
        let config = CacheConfig::new("redis://cache:6379");
        assert_eq!(config.url, "redis://cache:6379");
        assert_eq!(config.max_conflict_retries, 3);
        assert_eq!(config.key_prefix, "sms-issuer");
    }
}
