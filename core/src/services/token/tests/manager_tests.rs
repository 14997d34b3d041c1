//! Unit tests for the token manager

use std::sync::Arc;

use crate::domain::{PhoneKey, TokenRecord};
use crate::repositories::{Change, MockStore};
use crate::services::clock::ManualClock;
use crate::services::token::{assess, TokenConfig, TokenManager, VerifyOutcome};

const START: i64 = 1_700_000_000_000;

fn manager() -> (TokenManager, Arc<MockStore<TokenRecord>>, Arc<ManualClock>) {
    let store = Arc::new(MockStore::new());
    let clock = Arc::new(ManualClock::new(START));
    let manager = TokenManager::new(store.clone(), TokenConfig::default(), clock.clone());
    (manager, store, clock)
}

fn key() -> PhoneKey {
    PhoneKey::new("hashed-phone")
}

fn wrong(code: &str) -> String {
    let replacement = if code.starts_with('A') { "B" } else { "A" };
    format!("{}{}", replacement, &code[1..])
}

#[tokio::test]
async fn test_round_trip_is_single_use() {
    let (manager, store, _) = manager();
    let code = manager.generate(&key()).await.unwrap();

    assert_eq!(manager.verify(&key(), &code).await.unwrap(), VerifyOutcome::Verified);
    assert_eq!(store.len(), 0);
    assert_eq!(manager.verify(&key(), &code).await.unwrap(), VerifyOutcome::NotFound);
}

#[tokio::test]
async fn test_new_code_replaces_old() {
    let (manager, store, _) = manager();
    store.insert(key().as_str(), TokenRecord::new("AAAAAA", START));
    let code = manager.generate(&key()).await.unwrap();

    assert_eq!(store.get(key().as_str()).map(|r| r.code), Some(code));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_expired_code_is_kept_for_sweep() {
    let (manager, store, clock) = manager();
    let code = manager.generate(&key()).await.unwrap();

    clock.advance(TokenConfig::default().validity_ms + 1);
    assert_eq!(manager.verify(&key(), &code).await.unwrap(), VerifyOutcome::Expired);
    assert_eq!(store.len(), 1);

    assert_eq!(manager.periodic_cleanup().await.unwrap(), 1);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_tries_exhaustion() {
    let (manager, store, _) = manager();
    let code = manager.generate(&key()).await.unwrap();
    let bad = wrong(&code);

    for attempt in 1..=3 {
        assert_eq!(
            manager.verify(&key(), &bad).await.unwrap(),
            VerifyOutcome::WrongCode,
            "attempt {}",
            attempt
        );
    }
    assert_eq!(manager.verify(&key(), &bad).await.unwrap(), VerifyOutcome::TooManyTries);
    assert_eq!(manager.verify(&key(), &code).await.unwrap(), VerifyOutcome::TooManyTries);
    assert_eq!(store.get(key().as_str()).map(|r| r.tries), Some(4));
}

#[tokio::test]
async fn test_correct_code_after_three_wrong_guesses() {
    let (manager, _, _) = manager();
    let code = manager.generate(&key()).await.unwrap();
    for _ in 0..3 {
        manager.verify(&key(), &wrong(&code)).await.unwrap();
    }
    assert_eq!(manager.verify(&key(), &code).await.unwrap(), VerifyOutcome::Verified);
}

#[tokio::test]
async fn test_storage_failure_refuses_verification() {
    let (manager, store, _) = manager();
    let code = manager.generate(&key()).await.unwrap();
    store.set_failing(true);
    assert!(manager.verify(&key(), &code).await.is_err());
    assert!(manager.generate(&key()).await.is_err());
}

#[test]
fn test_assess_never_lowers_tries() {
    let config = TokenConfig::default();
    let record = TokenRecord {
        code: "AB2CDE".to_string(),
        tries: 7,
        created_at: START,
    };

    let (change, outcome) = assess(Some(&record), "XXXXXX", START, &config);
    assert_eq!(outcome, VerifyOutcome::TooManyTries);
    assert!(matches!(change, Change::Put(r) if r.tries == 8));

    let (change, outcome) = assess(Some(&record), "AB2CDE", START, &config);
    assert_eq!(outcome, VerifyOutcome::TooManyTries);
    assert_eq!(change, Change::Keep);
}
