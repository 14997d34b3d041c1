//! Admission decisions over IP and phone state

use std::sync::Arc;
use tracing::{debug, warn};

use super::policy::RateLimitPolicy;
use crate::domain::{IpKey, IpLimit, PhoneKey, PhoneLimit};
use crate::errors::DomainResult;
use crate::repositories::{Change, StorageBackend};
use crate::services::clock::Clock;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Denied { retry_after_ms: i64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }

    /// Milliseconds to wait; 0 when allowed
    pub fn retry_after_ms(&self) -> i64 {
        match self {
            RateLimitDecision::Allowed => 0,
            RateLimitDecision::Denied { retry_after_ms } => *retry_after_ms,
        }
    }

    fn from_wait(wait_ms: i64) -> Self {
        if wait_ms > 0 {
            RateLimitDecision::Denied {
                retry_after_ms: wait_ms,
            }
        } else {
            RateLimitDecision::Allowed
        }
    }
}

/// Entries removed by one [`RateLimiter::periodic_cleanup`] run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSweep {
    pub ip_removed: usize,
    pub phone_removed: usize,
}

/// Rate limiter over injected IP and phone stores.
///
/// The two axes live under different keys and are committed one after the
/// other. Each commit re-checks admission atomically for its own key, so a
/// concurrent request can make a check deny more than strictly needed but
/// never lets more than the budget through.
pub struct RateLimiter {
    ip_store: Arc<dyn StorageBackend<IpLimit>>,
    phone_store: Arc<dyn StorageBackend<PhoneLimit>>,
    policy: RateLimitPolicy,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(
        ip_store: Arc<dyn StorageBackend<IpLimit>>,
        phone_store: Arc<dyn StorageBackend<PhoneLimit>>,
        policy: RateLimitPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ip_store,
            phone_store,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Check and, when admitted, count a request at the current time.
    ///
    /// A storage failure is returned as an error; callers must treat it as a denial.
    pub async fn check(&self, ip: &IpKey, phone: &PhoneKey) -> DomainResult<RateLimitDecision> {
        self.check_at(ip, phone, self.clock.now_millis()).await
    }

    /// [`check`](Self::check) at an explicit timestamp
    pub async fn check_at(
        &self,
        ip: &IpKey,
        phone: &PhoneKey,
        now: i64,
    ) -> DomainResult<RateLimitDecision> {
        let ip_state = self.ip_store.retrieve(ip.as_str()).await?;
        let phone_state = self.phone_store.retrieve(phone.as_str()).await?;

        let ip_wait = self.ip_wait(ip_state.as_ref(), now);
        let phone_wait = self.phone_wait(phone_state.as_ref(), now);
        let wait = ip_wait.max(phone_wait);
        if wait > 0 {
            warn!(
                ip = %ip,
                ip_wait_ms = ip_wait,
                phone_wait_ms = phone_wait,
                "Rate limit exceeded"
            );
            return Ok(RateLimitDecision::from_wait(wait));
        }

        let (period, burst) = (self.policy.ip_period_ms, self.policy.ip_burst);
        let ip_update = self
            .ip_store
            .update(ip.as_str(), &|current| {
                IpLimit::admit(current, now, period, burst).map_or(Change::Keep, Change::Put)
            })
            .await?;
        if ip_update.change == Change::Keep {
            let wait = self.ip_wait(ip_update.previous.as_ref(), now);
            warn!(ip = %ip, wait_ms = wait, "IP budget taken by a concurrent request");
            return Ok(RateLimitDecision::from_wait(wait.max(1)));
        }

        let tiers = self.policy.phone_tiers;
        let phone_update = self
            .phone_store
            .update(phone.as_str(), &|current| {
                PhoneLimit::admit(current, now, &tiers).map_or(Change::Keep, Change::Put)
            })
            .await?;
        if phone_update.change == Change::Keep {
            let wait = self.phone_wait(phone_update.previous.as_ref(), now);
            warn!(ip = %ip, wait_ms = wait, "Phone budget taken by a concurrent request");
            return Ok(RateLimitDecision::from_wait(wait.max(1)));
        }

        debug!(ip = %ip, "Rate limit check admitted");
        Ok(RateLimitDecision::Allowed)
    }

    /// Milliseconds until the address prefix may make another request
    pub async fn ip_wait_ms(&self, ip: &IpKey) -> DomainResult<i64> {
        let state = self.ip_store.retrieve(ip.as_str()).await?;
        Ok(self.ip_wait(state.as_ref(), self.clock.now_millis()))
    }

    /// Milliseconds until the phone may receive another code
    pub async fn phone_wait_ms(&self, phone: &PhoneKey) -> DomainResult<i64> {
        let state = self.phone_store.retrieve(phone.as_str()).await?;
        Ok(self.phone_wait(state.as_ref(), self.clock.now_millis()))
    }

    /// Remove IP state that no longer restricts anything and phone state past retention
    pub async fn periodic_cleanup(&self) -> DomainResult<RateLimitSweep> {
        let ip_removed = self.cleanup_ip_limits().await?;
        let phone_removed = self.cleanup_phone_limits().await?;
        Ok(RateLimitSweep {
            ip_removed,
            phone_removed,
        })
    }

    /// Sweep IP entries older than one full burst
    pub async fn cleanup_ip_limits(&self) -> DomainResult<usize> {
        let now = self.clock.now_millis();
        let (period, burst) = (self.policy.ip_period_ms, self.policy.ip_burst);
        let removed = self
            .ip_store
            .remove_expired(&|state| state.is_stale(now, period, burst))
            .await?;
        debug!(removed, backend = self.ip_store.backend_name(), "IP rate limit state swept");
        Ok(removed)
    }

    /// Sweep phone entries untouched for the retention window
    pub async fn cleanup_phone_limits(&self) -> DomainResult<usize> {
        let now = self.clock.now_millis();
        let retention = self.policy.phone_retention_ms;
        let removed = self
            .phone_store
            .remove_expired(&|state| state.is_stale(now, retention))
            .await?;
        debug!(removed, backend = self.phone_store.backend_name(), "Phone rate limit state swept");
        Ok(removed)
    }

    fn ip_wait(&self, state: Option<&IpLimit>, now: i64) -> i64 {
        let next = IpLimit::next_try(state, now, self.policy.ip_period_ms, self.policy.ip_burst);
        (next - now).max(0)
    }

    fn phone_wait(&self, state: Option<&PhoneLimit>, now: i64) -> i64 {
        state
            .map(|s| (s.next_try(&self.policy.phone_tiers) - now).max(0))
            .unwrap_or(0)
    }
}
