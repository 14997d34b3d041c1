//! Storage keys derived from canonical caller identity.
//!
//! Both keys are opaque: an [`IpKey`] is the canonical address prefix and a
//! [`PhoneKey`] is usually a keyed hash of the E.164 number, so raw phone
//! numbers never reach a storage backend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rate-limit key for a caller's network prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpKey(String);

impl IpKey {
    /// Wrap an already canonicalized address prefix
    pub fn new(canonical: impl Into<String>) -> Self {
        Self(canonical.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key for phone rate-limit state and token records
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneKey(String);

impl PhoneKey {
    /// Wrap a phone identity (hashed or canonical number)
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhoneKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&str> for IpKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
