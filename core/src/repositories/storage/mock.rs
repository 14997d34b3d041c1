//! Mock implementation of StorageBackend for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::r#trait::{Change, ExpiryFn, StorageBackend, UpdateFn, Updated};
use super::record::StoredRecord;
use crate::errors::{DomainError, DomainResult};

/// HashMap-backed store with switchable failure injection
pub struct MockStore<R> {
    records: Mutex<HashMap<String, R>>,
    failing: AtomicBool,
    stalled: AtomicBool,
    writes: AtomicUsize,
}

impl<R: StoredRecord> MockStore<R> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
            stalled: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent call fail with a storage error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make `remove_expired` hang until the caller gives up on it
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    /// Number of mutating operations applied so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn get(&self, key: &str) -> Option<R> {
        self.records.lock().unwrap().get(key).cloned()
    }

    /// Seed a record without counting a write
    pub fn insert(&self, key: &str, record: R) {
        self.records.lock().unwrap().insert(key.to_string(), record);
    }

    fn check(&self, operation: &str, key: &str) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::storage(operation, key, "injected failure"));
        }
        Ok(())
    }
}

impl<R: StoredRecord> Default for MockStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: StoredRecord> StorageBackend<R> for MockStore<R> {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn store(&self, key: &str, record: &R) -> DomainResult<()> {
        self.check("store", key)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> DomainResult<Option<R>> {
        self.check("retrieve", key)?;
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    async fn remove(&self, key: &str) -> DomainResult<bool> {
        self.check("remove", key)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().unwrap().remove(key).is_some())
    }

    async fn update(&self, key: &str, apply: UpdateFn<'_, R>) -> DomainResult<Updated<R>> {
        self.check("update", key)?;
        let mut records = self.records.lock().unwrap();
        let previous = records.get(key).cloned();
        let change = apply(previous.as_ref());
        match &change {
            Change::Keep => {}
            Change::Put(record) => {
                self.writes.fetch_add(1, Ordering::SeqCst);
                records.insert(key.to_string(), record.clone());
            }
            Change::Delete => {
                self.writes.fetch_add(1, Ordering::SeqCst);
                records.remove(key);
            }
        }
        Ok(Updated { previous, change })
    }

    async fn remove_expired(&self, is_expired: ExpiryFn<'_, R>) -> DomainResult<usize> {
        self.check("remove_expired", "*")?;
        if self.stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|_, record| !is_expired(record));
        Ok(before - records.len())
    }
}
