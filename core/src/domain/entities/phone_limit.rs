//! Per-phone rate-limit state with an escalating backoff.
//!
//! The wait before the next admitted request grows with the number of recent
//! tries (0, 10s, 5min, 3h, 24h by default). Every full day of inactivity
//! erodes one try, so a number that was used heavily earlier recovers
//! gradually rather than all at once.

use serde::{Deserialize, Serialize};

/// One day in milliseconds
pub const DAY_MS: i64 = 86_400_000;

/// Upper bound of the try counter
pub const MAX_PHONE_TRIES: u32 = 5;

/// Backoff delays in milliseconds, indexed by `min(tries, 4)`
pub type PhoneTiers = [i64; 5];

/// State stored per [`PhoneKey`](crate::domain::PhoneKey)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneLimit {
    /// Recent admissions, in `0..=MAX_PHONE_TRIES`
    pub tries: u32,
    /// Timestamp (ms) of the last admission, or of first sight
    pub last_timestamp: i64,
}

impl PhoneLimit {
    pub fn new(tries: u32, last_timestamp: i64) -> Self {
        Self {
            tries: tries.min(MAX_PHONE_TRIES),
            last_timestamp,
        }
    }

    /// State for a number seen for the first time
    pub fn fresh(now: i64) -> Self {
        Self::new(0, now)
    }

    /// Earliest timestamp at which the next request may be admitted
    pub fn next_try(&self, tiers: &PhoneTiers) -> i64 {
        let tier = (self.tries as usize).min(tiers.len() - 1);
        self.last_timestamp + tiers[tier]
    }

    /// State after counting an admitted request at `now`.
    ///
    /// Callers must only count after `next_try(tiers) <= now`.
    pub fn counted(&self, now: i64, tiers: &PhoneTiers) -> PhoneLimit {
        debug_assert!(
            self.next_try(tiers) <= now,
            "counting phone rate limit while over the limit"
        );

        let mut tries = (self.tries + 1).min(MAX_PHONE_TRIES);
        let days_since_last = ((now - self.last_timestamp) / DAY_MS).max(0);
        let eroded = tries as i64 - days_since_last;
        if eroded >= 1 {
            tries = eroded as u32;
        }

        PhoneLimit {
            tries,
            last_timestamp: now,
        }
    }

    /// State after admitting a request at `now`, or `None` while still over the limit
    pub fn admit(stored: Option<&PhoneLimit>, now: i64, tiers: &PhoneTiers) -> Option<PhoneLimit> {
        let current = stored.copied().unwrap_or_else(|| PhoneLimit::fresh(now));
        if current.next_try(tiers) > now {
            None
        } else {
            Some(current.counted(now, tiers))
        }
    }

    /// Whether the entry is older than the retention window
    pub fn is_stale(&self, now: i64, retention_ms: i64) -> bool {
        self.last_timestamp < now - retention_ms
    }
}
