//! Storage backends for rate-limit state and token records.
//!
//! - [`MemoryStore`]: in-process sharded map, per-key atomic via shard locks
//! - [`RedisStore`]: shared Redis, per-key atomic via WATCH/MULTI/EXEC

pub mod memory;
pub mod redis_store;


pub use memory::MemoryStore;
pub use redis_store::RedisStore;
