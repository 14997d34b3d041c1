//! Shared utilities and common types for the SMS verification server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and environment loading
//! - Error codes exposed to callers
//! - Utility functions (phone masking for logs)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, CleanupConfig, ConfigError, Environment, LogFormat, LoggingConfig,
    RateLimitConfig, StorageConfig, StorageKind, VerificationConfig,
};
pub use errors::error_codes;
pub use utils::phone;
