//! Cache module for Redis access
//!
//! Connection setup with retry, per-call timeouts and the dedicated
//! connections needed for WATCH/MULTI/EXEC transactions.

pub mod redis_client;

#[cfg(test)]
mod tests;

pub use redis_client::{RedisClient, TransactionConnection};

// Re-export commonly used types
pub use sv_shared::CacheConfig;
