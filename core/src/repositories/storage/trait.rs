//! Storage backend trait defining the key/record contract.

use async_trait::async_trait;

use super::record::StoredRecord;
use crate::errors::DomainResult;

/// Outcome of a read-modify-write closure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<R> {
    /// Leave the stored value untouched
    Keep,
    /// Write this value, replacing any previous one
    Put(R),
    /// Delete the key
    Delete,
}

/// Result of [`StorageBackend::update`]: what was stored before and what was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Updated<R> {
    pub previous: Option<R>,
    pub change: Change<R>,
}

/// Closure deciding the new value of a key from its current value
pub type UpdateFn<'a, R> = &'a (dyn Fn(Option<&R>) -> Change<R> + Send + Sync);

/// Predicate used by the expiry sweep
pub type ExpiryFn<'a, R> = &'a (dyn Fn(&R) -> bool + Send + Sync);

/// Key/record store for one record type.
///
/// Every operation on a single key is atomic with respect to other operations
/// on the same key. Nothing is guaranteed across keys.
///
/// # Failure Model
/// Any `Err` means the operation's effect is unknown to the caller, which must
/// fail closed. Backends never report a conflicting write as success.
#[async_trait]
pub trait StorageBackend<R: StoredRecord>: Send + Sync {
    /// Short name used in log fields
    fn backend_name(&self) -> &'static str;

    /// Insert or replace the record under `key`
    async fn store(&self, key: &str, record: &R) -> DomainResult<()>;

    /// Fetch the record under `key`
    async fn retrieve(&self, key: &str) -> DomainResult<Option<R>>;

    /// Delete the record under `key`; `Ok(true)` when something was removed
    async fn remove(&self, key: &str) -> DomainResult<bool>;

    /// Atomically read the record under `key`, compute a [`Change`] and apply it.
    ///
    /// `apply` may run more than once when a backend retries after a conflict,
    /// so it must be a pure function of its input.
    async fn update(&self, key: &str, apply: UpdateFn<'_, R>) -> DomainResult<Updated<R>>;

    /// Delete every record matching `is_expired`, returning how many went.
    ///
    /// Each key is re-checked at deletion time, so a record refreshed
    /// during the sweep survives.
    async fn remove_expired(&self, is_expired: ExpiryFn<'_, R>) -> DomainResult<usize>;
}
