pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod record;

pub use r#trait::{Change, ExpiryFn, StorageBackend, UpdateFn, Updated};
pub use record::{RecordShape, StoredRecord};

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockStore;

#[cfg(test)]
mod tests;
