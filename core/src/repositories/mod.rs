//! Storage abstraction shared by the rate limiter and the token manager.

pub mod storage;

pub use storage::{
    Change, ExpiryFn, RecordShape, StorageBackend, StoredRecord, UpdateFn, Updated,
};

#[cfg(test)]
pub use storage::MockStore;
