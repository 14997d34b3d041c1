//! # SMS Verification Core
//!
//! Core business logic for issuing one-time SMS verification codes.
//! This crate contains the domain entities, the identity canonicalizer, the
//! dual-axis rate limiter, the single-use token manager, the storage backend
//! contract and the error types the rest of the workspace builds on.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
