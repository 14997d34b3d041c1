//! Unit tests for the mock storage backend

use crate::domain::entities::TokenRecord;
use crate::repositories::{Change, MockStore, StorageBackend};

#[tokio::test]
async fn test_store_retrieve_remove() {
    let store = MockStore::<TokenRecord>::new();
    let record = TokenRecord::new("AB2CDE", 0);

    store.store("k", &record).await.unwrap();
    assert_eq!(store.retrieve("k").await.unwrap(), Some(record));
    assert!(store.remove("k").await.unwrap());
    assert!(!store.remove("k").await.unwrap());
    assert_eq!(store.retrieve("k").await.unwrap(), None);
}

#[tokio::test]
async fn test_update_reports_previous() {
    let store = MockStore::<TokenRecord>::new();
    store.insert("k", TokenRecord::new("AB2CDE", 0));

    let updated = store
        .update("k", &|current| match current {
            Some(record) => Change::Put(record.with_failed_try()),
            None => Change::Keep,
        })
        .await
        .unwrap();

    assert_eq!(updated.previous.map(|r| r.tries), Some(0));
    assert_eq!(store.get("k").map(|r| r.tries), Some(1));
}

#[tokio::test]
async fn test_keep_does_not_write() {
    let store = MockStore::<TokenRecord>::new();
    store.update("k", &|_| Change::Keep).await.unwrap();
    assert_eq!(store.write_count(), 0);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_remove_expired() {
    let store = MockStore::<TokenRecord>::new();
    store.insert("old", TokenRecord::new("AAAAAA", 0));
    store.insert("new", TokenRecord::new("BBBBBB", 10_000));

    let removed = store
        .remove_expired(&|record| record.created_at < 5_000)
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert!(store.get("new").is_some());
}

#[tokio::test]
async fn test_injected_failure() {
    let store = MockStore::<TokenRecord>::new();
    store.set_failing(true);
    let err = store.retrieve("k").await.unwrap_err();
    assert!(err.is_storage());
}
