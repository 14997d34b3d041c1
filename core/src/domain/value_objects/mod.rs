//! Value objects representing immutable domain concepts.

pub mod keys;

// Re-export commonly used types
pub use keys::{IpKey, PhoneKey};
