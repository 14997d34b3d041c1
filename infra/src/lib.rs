//! # Infrastructure Layer
//!
//! Concrete implementations behind the verification core:
//! - **Storage**: an in-process `dashmap` backend and a Redis backend using
//!   optimistic WATCH/MULTI/EXEC transactions
//! - **Cache**: Redis client with connection retry and per-call timeouts
//! - **SMS**: a logging sender for development
//! - **Services**: wiring of the selected backend into an [`services::AppContext`]
//! - **Telemetry**: `tracing-subscriber` initialization

pub use sv_core::errors::*;

/// Cache module - Redis client and operations
pub mod cache;

/// Services module - application context construction
pub mod services;

/// SMS module - development sender
pub mod sms;

/// Storage module - backend implementations
pub mod storage;

/// Telemetry module - log subscriber setup
pub mod telemetry;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// A Redis call did not answer in time
    #[error("Cache timeout during {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Domain error raised while wiring services
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<sv_shared::ConfigError> for InfrastructureError {
    fn from(err: sv_shared::ConfigError) -> Self {
        InfrastructureError::Config(err.to_string())
    }
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Domain(inner) => inner,
            InfrastructureError::Timeout(operation) => {
                DomainError::storage(operation, "", "timeout")
            }
            other => DomainError::storage("redis", "", other.to_string()),
        }
    }
}
