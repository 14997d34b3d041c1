//! Rate-limit parameters resolved from configuration

use sv_shared::config::rate_limit::PHONE_TIER_COUNT;
use sv_shared::RateLimitConfig;

use crate::domain::{PhoneTiers, DAY_MS};
use crate::errors::{DomainError, DomainResult};

/// Limits applied by the [`RateLimiter`](super::RateLimiter)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Spacing between admitted requests from one address prefix
    pub ip_period_ms: i64,
    /// Back-to-back requests an idle prefix may make
    pub ip_burst: i64,
    /// Phone backoff indexed by try count
    pub phone_tiers: PhoneTiers,
    /// Phone state older than this is swept
    pub phone_retention_ms: i64,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            ip_period_ms: 10_000,
            ip_burst: 3,
            phone_tiers: [0, 10_000, 300_000, 10_800_000, 86_400_000],
            phone_retention_ms: 5 * DAY_MS,
        }
    }
}

impl RateLimitPolicy {
    pub fn from_config(config: &RateLimitConfig) -> DomainResult<Self> {
        config.validate().map_err(|e| DomainError::Validation {
            message: e.to_string(),
        })?;

        let phone_tiers: PhoneTiers =
            config
                .phone_tiers_ms
                .as_slice()
                .try_into()
                .map_err(|_| DomainError::Validation {
                    message: format!("expected {} phone tiers", PHONE_TIER_COUNT),
                })?;

        Ok(Self {
            ip_period_ms: config.ip_period_ms,
            ip_burst: config.ip_burst,
            phone_tiers,
            phone_retention_ms: config.phone_retention_ms(),
        })
    }
}
