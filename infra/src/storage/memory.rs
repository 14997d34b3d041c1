//! In-process storage backend

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use sv_core::errors::DomainResult;
use sv_core::repositories::{Change, ExpiryFn, StorageBackend, StoredRecord, UpdateFn, Updated};

/// Concurrent map keyed by the record key.
///
/// State is lost on restart and not shared between processes. Operations on
/// one key serialize on that key's shard; the sweep walks shards one at a
/// time and never blocks the whole map.
pub struct MemoryStore<R> {
    records: DashMap<String, R>,
}

impl<R: StoredRecord> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: StoredRecord> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: StoredRecord> StorageBackend<R> for MemoryStore<R> {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn store(&self, key: &str, record: &R) -> DomainResult<()> {
        self.records.insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> DomainResult<Option<R>> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    async fn remove(&self, key: &str) -> DomainResult<bool> {
        Ok(self.records.remove(key).is_some())
    }

    async fn update(&self, key: &str, apply: UpdateFn<'_, R>) -> DomainResult<Updated<R>> {
        // The entry holds its shard's write lock until dropped
        let updated = match self.records.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                let previous = entry.get().clone();
                let change = apply(Some(&previous));
                match &change {
                    Change::Keep => {}
                    Change::Put(record) => {
                        entry.insert(record.clone());
                    }
                    Change::Delete => {
                        entry.remove();
                    }
                }
                Updated {
                    previous: Some(previous),
                    change,
                }
            }
            Entry::Vacant(entry) => {
                let change = apply(None);
                if let Change::Put(record) = &change {
                    entry.insert(record.clone());
                }
                Updated {
                    previous: None,
                    change,
                }
            }
        };
        Ok(updated)
    }

    async fn remove_expired(&self, is_expired: ExpiryFn<'_, R>) -> DomainResult<usize> {
        let mut removed = 0;
        self.records.retain(|_, record| {
            if is_expired(record) {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}
