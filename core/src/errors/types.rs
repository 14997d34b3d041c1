//! Verification failures with bilingual messages
//!
//! Token failures stay distinct in logs ([`VerificationError::log_code`]) but
//! collapse to one public code so a caller cannot tell whether a code exists.

use sv_shared::error_codes;
use thiserror::Error;

/// Errors returned by the verification flow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid phone number | Ongeldig telefoonnummer")]
    InvalidPhoneNumber,

    #[error("Too many requests. Retry in {retry_after_ms} ms | Te veel verzoeken, probeer over {retry_after_ms} ms opnieuw")]
    RateLimited { retry_after_ms: i64 },

    #[error("Verification code not found | Verificatiecode niet gevonden")]
    TokenNotFound,

    #[error("Verification code expired | Verificatiecode verlopen")]
    TokenExpired,

    #[error("Verification code incorrect | Verificatiecode onjuist")]
    TokenMismatch,

    #[error("Too many attempts. Request a new code | Te veel pogingen, vraag een nieuwe code aan")]
    TokenTooManyTries,

    #[error("Storage unavailable | Opslag niet beschikbaar")]
    StorageUnavailable,

    #[error("SMS could not be sent | SMS kon niet worden verzonden")]
    SendFailed,

    #[error("Credential could not be issued | Credential kon niet worden uitgegeven")]
    IssuanceFailed,
}

impl VerificationError {
    /// Code exposed to callers; all token failures share one value
    pub fn public_code(&self) -> &'static str {
        match self {
            VerificationError::InvalidPhoneNumber => error_codes::ADDRESS_MALFORMED,
            VerificationError::RateLimited { .. } => error_codes::RATE_LIMITED,
            VerificationError::TokenNotFound
            | VerificationError::TokenExpired
            | VerificationError::TokenMismatch
            | VerificationError::TokenTooManyTries => error_codes::CANNOT_VALIDATE_TOKEN,
            VerificationError::StorageUnavailable => error_codes::INTERNAL_ERROR,
            VerificationError::SendFailed => error_codes::SENDING_SMS,
            VerificationError::IssuanceFailed => error_codes::INTERNAL_ERROR,
        }
    }

    /// Distinct code for structured logs
    pub fn log_code(&self) -> &'static str {
        match self {
            VerificationError::InvalidPhoneNumber => "INVALID_PHONE_NUMBER",
            VerificationError::RateLimited { .. } => "RATE_LIMITED",
            VerificationError::TokenNotFound => "TOKEN_NOT_FOUND",
            VerificationError::TokenExpired => "TOKEN_EXPIRED",
            VerificationError::TokenMismatch => "TOKEN_MISMATCH",
            VerificationError::TokenTooManyTries => "TOKEN_TOO_MANY_TRIES",
            VerificationError::StorageUnavailable => "STORAGE_UNAVAILABLE",
            VerificationError::SendFailed => "SEND_FAILED",
            VerificationError::IssuanceFailed => "ISSUANCE_FAILED",
        }
    }

    /// Milliseconds the caller should wait, for rate-limit denials
    pub fn retry_after_ms(&self) -> Option<i64> {
        match self {
            VerificationError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// English half of a bilingual message
pub fn english_message(error_msg: &str) -> &str {
    match error_msg.find(" | ") {
        Some(pipe_index) => &error_msg[..pipe_index],
        None => error_msg,
    }
}

/// Dutch half of a bilingual message
pub fn dutch_message(error_msg: &str) -> &str {
    match error_msg.find(" | ") {
        Some(pipe_index) => &error_msg[pipe_index + 3..],
        None => error_msg,
    }
}
