//! Rate limiting configuration module

use serde::{Deserialize, Serialize};

use super::{env_parse, ConfigError};

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Number of phone backoff tiers (tries 0 through 4)
pub const PHONE_TIER_COUNT: usize = 5;

/// Upper bound for the IP burst window (`ip_period_ms * ip_burst`) and for
/// any single phone tier, so timestamp arithmetic cannot overflow
pub const MAX_WINDOW_MS: i64 = 30 * DAY_MS;

/// Rate limiting configuration for the IP and phone axes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Minimum spacing between admitted requests from one IP prefix, in milliseconds
    #[serde(default = "default_ip_period_ms")]
    pub ip_period_ms: i64,

    /// Requests an idle IP prefix may make back to back before throttling
    #[serde(default = "default_ip_burst")]
    pub ip_burst: i64,

    /// Wait before the next admitted request, indexed by the phone's try count
    #[serde(default = "default_phone_tiers_ms")]
    pub phone_tiers_ms: Vec<i64>,

    /// Phone state untouched for this many days is swept
    #[serde(default = "default_phone_retention_days")]
    pub phone_retention_days: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            ip_period_ms: default_ip_period_ms(),
            ip_burst: default_ip_burst(),
            phone_tiers_ms: default_phone_tiers_ms(),
            phone_retention_days: default_phone_retention_days(),
        }
    }
}

impl RateLimitConfig {
    /// Load overrides from `RATE_LIMIT_IP_PERIOD_MS`, `RATE_LIMIT_IP_BURST`,
    /// `RATE_LIMIT_PHONE_TIERS_MS` (comma separated) and `RATE_LIMIT_PHONE_RETENTION_DAYS`
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let phone_tiers_ms = match super::env_list("RATE_LIMIT_PHONE_TIERS_MS") {
            Some(items) => items
                .iter()
                .map(|item| {
                    item.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                        field: "RATE_LIMIT_PHONE_TIERS_MS".to_string(),
                        reason: format!("cannot parse '{}'", item),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.phone_tiers_ms,
        };

        Ok(Self {
            ip_period_ms: env_parse("RATE_LIMIT_IP_PERIOD_MS")?.unwrap_or(defaults.ip_period_ms),
            ip_burst: env_parse("RATE_LIMIT_IP_BURST")?.unwrap_or(defaults.ip_burst),
            phone_tiers_ms,
            phone_retention_days: env_parse("RATE_LIMIT_PHONE_RETENTION_DAYS")?
                .unwrap_or(defaults.phone_retention_days),
        })
    }

    /// Validate ranges and the tier table shape
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ip_period_ms <= 0 {
            return Err(invalid("ip_period_ms", "must be positive"));
        }
        if self.ip_burst < 1 {
            return Err(invalid("ip_burst", "must be at least 1"));
        }
        match self.ip_period_ms.checked_mul(self.ip_burst) {
            Some(window) if window <= MAX_WINDOW_MS => {}
            _ => {
                return Err(invalid(
                    "ip_period_ms",
                    "ip_period_ms * ip_burst must not exceed 30 days",
                ))
            }
        }
        if self.phone_tiers_ms.len() != PHONE_TIER_COUNT {
            return Err(invalid(
                "phone_tiers_ms",
                &format!("expected {} tiers, got {}", PHONE_TIER_COUNT, self.phone_tiers_ms.len()),
            ));
        }
        if self.phone_tiers_ms.iter().any(|tier| *tier < 0) {
            return Err(invalid("phone_tiers_ms", "tiers cannot be negative"));
        }
        if self.phone_tiers_ms.iter().any(|tier| *tier > MAX_WINDOW_MS) {
            return Err(invalid("phone_tiers_ms", "a tier cannot exceed 30 days"));
        }
        if !(1..=3_650).contains(&self.phone_retention_days) {
            return Err(invalid("phone_retention_days", "must be between 1 and 3650"));
        }
        Ok(())
    }

    /// Phone retention window in milliseconds
    pub fn phone_retention_ms(&self) -> i64 {
        self.phone_retention_days * DAY_MS
    }

}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn default_ip_period_ms() -> i64 {
    10 * SECOND_MS
}

fn default_ip_burst() -> i64 {
    3
}

fn default_phone_tiers_ms() -> Vec<i64> {
    vec![0, 10 * SECOND_MS, 5 * MINUTE_MS, 3 * HOUR_MS, 24 * HOUR_MS]
}

fn default_phone_retention_days() -> i64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_curve() {
        let config = RateLimitConfig::default();
        assert_eq!(config.ip_period_ms, 10_000);
        assert_eq!(config.ip_burst, 3);
        assert_eq!(
            config.phone_tiers_ms,
            vec![0, 10_000, 300_000, 10_800_000, 86_400_000]
        );
        assert_eq!(config.phone_retention_ms(), 5 * 86_400_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_tier_count() {
        let config = RateLimitConfig {
            phone_tiers_ms: vec![0, 1_000],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_ip_window() {
        let config = RateLimitConfig {
            ip_period_ms: i64::MAX / 2,
            ip_burst: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RateLimitConfig {
            ip_period_ms: MAX_WINDOW_MS,
            ip_burst: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_tier() {
        let config = RateLimitConfig {
            phone_tiers_ms: vec![0, 1_000, 2_000, 3_000, i64::MAX],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_burst() {
        let config = RateLimitConfig {
            ip_burst: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
