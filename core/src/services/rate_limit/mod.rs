//! Dual-axis rate limiting.
//!
//! Every request is checked against two independent budgets:
//! - the caller's address prefix ([`IpLimit`](crate::domain::IpLimit)): a
//!   small burst, then one request per period
//! - the target phone ([`PhoneLimit`](crate::domain::PhoneLimit)): an
//!   escalating backoff that decays by one step per idle day
//!
//! A request is admitted only when both axes admit it, and state is only
//! counted on admission.

mod limiter;
mod policy;

#[cfg(test)]
mod tests;

pub use limiter::{RateLimitDecision, RateLimitSweep, RateLimiter};
pub use policy::RateLimitPolicy;
