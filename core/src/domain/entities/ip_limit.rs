//! Per-IP rate-limit state.
//!
//! The remaining budget of an address prefix is expressed as a single
//! timestamp. An idle prefix behaves as if its last admission was `burst`
//! periods ago, so it may make `burst` requests back to back; after that each
//! admission pushes the timestamp one period forward.

use serde::{Deserialize, Serialize};

/// State stored per [`IpKey`](crate::domain::IpKey)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpLimit {
    /// Timestamp (ms) that the most recent admission consumed
    pub next_allowed_at: i64,
}

impl IpLimit {
    pub fn new(next_allowed_at: i64) -> Self {
        Self { next_allowed_at }
    }

    /// Earliest timestamp at which the next request may be admitted.
    ///
    /// `stored` is `None` for a prefix that has never been seen.
    pub fn next_try(stored: Option<&IpLimit>, now: i64, period_ms: i64, burst: i64) -> i64 {
        let floor = now.saturating_sub(period_ms.saturating_mul(burst));
        let base = stored.map_or(0, |s| s.next_allowed_at).max(floor);
        base.saturating_add(period_ms)
    }

    /// State after admitting a request at `now`, or `None` while still over the limit
    pub fn admit(stored: Option<&IpLimit>, now: i64, period_ms: i64, burst: i64) -> Option<IpLimit> {
        let next_try = Self::next_try(stored, now, period_ms, burst);
        if next_try > now {
            None
        } else {
            Some(IpLimit::new(next_try))
        }
    }

    /// A stale entry restricts nothing and behaves exactly like an absent one
    pub fn is_stale(&self, now: i64, period_ms: i64, burst: i64) -> bool {
        self.next_allowed_at < now.saturating_sub(period_ms.saturating_mul(burst))
    }
}
