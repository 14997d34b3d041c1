//! Domain entities persisted through a storage backend.

pub mod ip_limit;
pub mod phone_limit;
pub mod token_record;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use ip_limit::IpLimit;
pub use phone_limit::{PhoneLimit, PhoneTiers, DAY_MS, MAX_PHONE_TRIES};
pub use token_record::{TokenRecord, CODE_LENGTH};
