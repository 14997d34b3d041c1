//! Unit tests for token records

use crate::domain::entities::TokenRecord;

#[test]
fn test_new_record_has_no_tries() {
    let record = TokenRecord::new("ABCDEF", 1_000);
    assert_eq!(record.tries, 0);
    assert_eq!(record.created_at, 1_000);
}

#[test]
fn test_expiry_boundary() {
    let record = TokenRecord::new("ABCDEF", 1_000);
    assert!(!record.is_expired(1_000 + 60_000, 60_000));
    assert!(record.is_expired(1_000 + 60_001, 60_000));
}

#[test]
fn test_failed_try_increments() {
    let record = TokenRecord::new("ABCDEF", 0).with_failed_try().with_failed_try();
    assert_eq!(record.tries, 2);
    assert_eq!(record.code, "ABCDEF");
}
