//! Periodic cleanup configuration

use serde::{Deserialize, Serialize};

use super::{env_parse, ConfigError};

/// Configuration for the background expiry sweep
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// How often to run cleanup (in seconds)
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Whether to enable automatic cleanup
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            enabled: default_enabled(),
        }
    }
}

impl CleanupConfig {
    /// Read `CLEANUP_INTERVAL_SECONDS` and `CLEANUP_ENABLED`
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            interval_seconds: env_parse("CLEANUP_INTERVAL_SECONDS")?
                .unwrap_or(defaults.interval_seconds),
            enabled: env_parse("CLEANUP_ENABLED")?.unwrap_or(defaults.enabled),
        };
        config.validate()?;
        Ok(config)
    }

    /// A zero interval cannot drive a timer
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "CLEANUP_INTERVAL_SECONDS".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn default_interval_seconds() -> u64 {
    300 // every 5 minutes
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = CleanupConfig {
            interval_seconds: 0,
            enabled: true,
        };
        assert!(config.validate().is_err());
        assert!(CleanupConfig::default().validate().is_ok());
    }
}
