//! Keyed hashing of phone numbers

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::PhoneKey;
use crate::errors::{DomainError, DomainResult};

type HmacSha256 = Hmac<Sha256>;

/// Minimum key length in bytes
pub const MIN_KEY_LEN: usize = 32;

/// Derives `base64(HMAC-SHA256(key, e164))` phone keys
#[derive(Clone)]
pub struct PhoneHasher {
    key: Vec<u8>,
}

impl PhoneHasher {
    pub fn new(key: &[u8]) -> DomainResult<Self> {
        if key.len() < MIN_KEY_LEN {
            return Err(DomainError::Validation {
                message: format!("phone hash key must be at least {} bytes", MIN_KEY_LEN),
            });
        }
        Ok(Self { key: key.to_vec() })
    }

    pub fn phone_key(&self, e164: &str) -> DomainResult<PhoneKey> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| DomainError::internal(format!("invalid HMAC key: {}", e)))?;
        mac.update(e164.as_bytes());
        let digest = mac.finalize().into_bytes();
        Ok(PhoneKey::new(STANDARD.encode(digest)))
    }
}

impl std::fmt::Debug for PhoneHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhoneHasher").field("key", &"<redacted>").finish()
    }
}
