//! Domain-specific error types and error handling.

mod types;


pub use types::{dutch_message, english_message, VerificationError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    /// A backend operation failed or timed out; callers fail closed
    #[error("Storage error during {operation} on '{key}': {reason}")]
    Storage {
        operation: String,
        key: String,
        reason: String,
    },

    // Bridge to the verification taxonomy
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl DomainError {
    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    pub fn storage(
        operation: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DomainError::Storage {
            operation: operation.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from the storage layer
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            DomainError::Storage { .. }
                | DomainError::Verification(VerificationError::StorageUnavailable)
        )
    }

    /// Collapse into the verification taxonomy.
    ///
    /// Storage failures become [`VerificationError::StorageUnavailable`];
    /// anything else that is not already a verification error is treated the same,
    /// since the caller can only refuse the request.
    pub fn into_verification(self) -> VerificationError {
        match self {
            DomainError::Verification(err) => err,
            _ => VerificationError::StorageUnavailable,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
