//! Wire shape of every record kept by a storage backend.
//!
//! The distributed backend stores scalars as plain strings and structured
//! records as hashes with named fields; the local backend keeps values as-is.

use crate::domain::entities::{IpLimit, PhoneLimit, TokenRecord};

/// How a record is laid out in a key-value store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// A single string value
    Scalar,
    /// A hash with these field names, in encode order
    Fields(&'static [&'static str]),
}

/// A value that can be persisted by a [`StorageBackend`](super::StorageBackend)
pub trait StoredRecord: Clone + Send + Sync + 'static {
    /// Key namespace, the middle part of `<prefix>:<namespace>:<key>:`
    const NAMESPACE: &'static str;

    const SHAPE: RecordShape;

    /// Values in [`Self::SHAPE`] order
    fn encode(&self) -> Vec<String>;

    /// Inverse of `encode`; `None` for missing or malformed values
    fn decode(values: &[String]) -> Option<Self>;
}

impl StoredRecord for IpLimit {
    const NAMESPACE: &'static str = "ip-limits";
    const SHAPE: RecordShape = RecordShape::Scalar;

    fn encode(&self) -> Vec<String> {
        vec![self.next_allowed_at.to_string()]
    }

    fn decode(values: &[String]) -> Option<Self> {
        let next_allowed_at = values.first()?.parse().ok()?;
        Some(IpLimit::new(next_allowed_at))
    }
}

impl StoredRecord for PhoneLimit {
    const NAMESPACE: &'static str = "phone-limits";
    const SHAPE: RecordShape = RecordShape::Fields(&["timestamp", "tries"]);

    fn encode(&self) -> Vec<String> {
        vec![self.last_timestamp.to_string(), self.tries.to_string()]
    }

    fn decode(values: &[String]) -> Option<Self> {
        match values {
            [timestamp, tries] => Some(PhoneLimit::new(tries.parse().ok()?, timestamp.parse().ok()?)),
            _ => None,
        }
    }
}

impl StoredRecord for TokenRecord {
    const NAMESPACE: &'static str = "request";
    const SHAPE: RecordShape = RecordShape::Fields(&["token", "tries", "created"]);

    fn encode(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.tries.to_string(),
            self.created_at.to_string(),
        ]
    }

    fn decode(values: &[String]) -> Option<Self> {
        match values {
            [token, tries, created] => Some(TokenRecord {
                code: token.clone(),
                tries: tries.parse().ok()?,
                created_at: created.parse().ok()?,
            }),
            _ => None,
        }
    }
}
