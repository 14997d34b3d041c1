//! Unit tests for the dual-axis rate limiter

use std::sync::Arc;

use crate::domain::{IpKey, IpLimit, PhoneKey, PhoneLimit, DAY_MS};
use crate::repositories::MockStore;
use crate::services::clock::ManualClock;
use crate::services::rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimiter};

const START: i64 = 1_700_000_000_000;

struct Fixture {
    ips: Arc<MockStore<IpLimit>>,
    phones: Arc<MockStore<PhoneLimit>>,
    clock: Arc<ManualClock>,
    limiter: RateLimiter,
}

fn fixture() -> Fixture {
    let ips = Arc::new(MockStore::new());
    let phones = Arc::new(MockStore::new());
    let clock = Arc::new(ManualClock::new(START));
    let limiter = RateLimiter::new(
        ips.clone(),
        phones.clone(),
        RateLimitPolicy::default(),
        clock.clone(),
    );
    Fixture {
        ips,
        phones,
        clock,
        limiter,
    }
}

fn ip(n: u8) -> IpKey {
    IpKey::new(format!("192.0.2.{}", n))
}

fn phone(n: u8) -> PhoneKey {
    PhoneKey::new(format!("phone-{}", n))
}

#[tokio::test]
async fn test_ip_burst_then_denied() {
    let f = fixture();

    for n in 0..3 {
        let decision = f.limiter.check(&ip(1), &phone(n)).await.unwrap();
        assert_eq!(decision, RateLimitDecision::Allowed);
    }

    let denied = f.limiter.check(&ip(1), &phone(9)).await.unwrap();
    assert_eq!(denied, RateLimitDecision::Denied { retry_after_ms: 10_000 });
}

#[tokio::test]
async fn test_ip_throttles_after_burst() {
    let f = fixture();
    for n in 0..3 {
        f.limiter.check(&ip(1), &phone(n)).await.unwrap();
    }

    f.clock.advance(10_000);
    assert!(f.limiter.check(&ip(1), &phone(3)).await.unwrap().is_allowed());
    assert_eq!(
        f.limiter.check(&ip(1), &phone(4)).await.unwrap().retry_after_ms(),
        10_000
    );
}

#[tokio::test]
async fn test_phone_backoff_sequence() {
    let f = fixture();

    assert!(f.limiter.check(&ip(1), &phone(1)).await.unwrap().is_allowed());

    let second = f.limiter.check(&ip(2), &phone(1)).await.unwrap();
    assert_eq!(second, RateLimitDecision::Denied { retry_after_ms: 10_000 });

    f.clock.advance(10_000);
    assert!(f.limiter.check(&ip(3), &phone(1)).await.unwrap().is_allowed());

    let fourth = f.limiter.check(&ip(4), &phone(1)).await.unwrap();
    assert_eq!(fourth, RateLimitDecision::Denied { retry_after_ms: 300_000 });
}

#[tokio::test]
async fn test_denied_check_mutates_nothing() {
    let f = fixture();
    f.limiter.check(&ip(1), &phone(1)).await.unwrap();
    let writes = f.ips.write_count() + f.phones.write_count();
    let ip_before = f.ips.get(ip(2).as_str());

    let first = f.limiter.check(&ip(2), &phone(1)).await.unwrap();
    let again = f.limiter.check(&ip(2), &phone(1)).await.unwrap();

    assert_eq!(first, again);
    assert_eq!(f.ips.write_count() + f.phones.write_count(), writes);
    assert_eq!(f.ips.get(ip(2).as_str()), ip_before);
}

#[tokio::test]
async fn test_wait_is_max_of_both_axes() {
    let f = fixture();
    f.phones.insert(phone(1).as_str(), PhoneLimit::new(2, START));
    for n in 2..5 {
        f.limiter.check(&ip(1), &phone(n)).await.unwrap();
    }

    let decision = f.limiter.check(&ip(1), &phone(1)).await.unwrap();
    assert_eq!(decision.retry_after_ms(), 300_000);
}

#[tokio::test]
async fn test_phone_decay_on_admission() {
    let f = fixture();
    f.phones
        .insert(phone(1).as_str(), PhoneLimit::new(5, START - 2 * DAY_MS));

    assert!(f.limiter.check(&ip(1), &phone(1)).await.unwrap().is_allowed());
    assert_eq!(
        f.phones.get(phone(1).as_str()),
        Some(PhoneLimit::new(3, START))
    );
}

#[tokio::test]
async fn test_storage_failure_is_an_error() {
    let f = fixture();
    f.phones.set_failing(true);
    assert!(f.limiter.check(&ip(1), &phone(1)).await.is_err());
    assert_eq!(f.ips.write_count(), 0);
}

#[tokio::test]
async fn test_wait_queries() {
    let f = fixture();
    f.limiter.check(&ip(1), &phone(1)).await.unwrap();
    assert_eq!(f.limiter.ip_wait_ms(&ip(1)).await.unwrap(), 0);
    assert_eq!(f.limiter.phone_wait_ms(&phone(1)).await.unwrap(), 10_000);
    assert_eq!(f.limiter.phone_wait_ms(&phone(2)).await.unwrap(), 0);
}

#[tokio::test]
async fn test_cleanup_removes_only_stale_state() {
    let f = fixture();
    f.ips.insert("stale", IpLimit::new(START - 30_001));
    f.ips.insert("fresh", IpLimit::new(START - 10_000));
    f.phones.insert("old", PhoneLimit::new(1, START - 5 * DAY_MS - 1));
    f.phones.insert("recent", PhoneLimit::new(1, START - DAY_MS));

    let sweep = f.limiter.periodic_cleanup().await.unwrap();

    assert_eq!(sweep.ip_removed, 1);
    assert_eq!(sweep.phone_removed, 1);
    assert!(f.ips.get("fresh").is_some());
    assert!(f.phones.get("recent").is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checks_never_exceed_burst() {
    let f = Arc::new(fixture());

    let handles: Vec<_> = (0..16u8)
        .map(|n| {
            let f = f.clone();
            tokio::spawn(async move { f.limiter.check(&ip(1), &phone(n)).await.unwrap() })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().is_allowed() {
            admitted += 1;
        }
    }
    assert!(admitted <= 3, "admitted {} requests", admitted);
    assert!(admitted >= 1);
}
