//! One-time code awaiting verification.

use serde::{Deserialize, Serialize};

/// Length of a generated code
pub const CODE_LENGTH: usize = 6;

/// The single active code for a [`PhoneKey`](crate::domain::PhoneKey).
///
/// Storing a new record replaces the previous one, so only the newest code
/// is ever valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// The code sent by SMS
    pub code: String,
    /// Wrong guesses so far; only ever increases
    pub tries: u32,
    /// Creation timestamp in milliseconds
    pub created_at: i64,
}

impl TokenRecord {
    /// Fresh record with no tries
    pub fn new(code: impl Into<String>, created_at: i64) -> Self {
        Self {
            code: code.into(),
            tries: 0,
            created_at,
        }
    }

    /// Whether the validity window has passed at `now`
    pub fn is_expired(&self, now: i64, validity_ms: i64) -> bool {
        now - self.created_at > validity_ms
    }

    /// Copy of this record with one more wrong guess counted
    pub fn with_failed_try(&self) -> Self {
        Self {
            tries: self.tries.saturating_add(1),
            ..self.clone()
        }
    }
}
