//! Canonicalization of caller identity.
//!
//! Raw phone numbers and remote addresses are turned into stable keys before
//! they reach the rate limiter or the token manager:
//! - phones are parsed, checked against the approved countries, filtered to
//!   mobile numbers and formatted as E.164
//! - IPv4 addresses are kept as-is, IPv6 addresses are truncated to a /56
//! - phone keys are a keyed hash of the E.164 form, so raw numbers are never stored

mod hasher;
mod ip;
mod phone;

#[cfg(test)]
mod tests;

pub use hasher::PhoneHasher;
pub use ip::{canonical_ip, IPV6_PREFIX_LEN};
pub use phone::PhoneCanonicalizer;

use sv_shared::VerificationConfig;

use crate::domain::{IpKey, PhoneKey};
use crate::errors::DomainResult;

/// A phone number that passed canonicalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPhone {
    /// E.164 form, handed to the sender and the issuance signer
    pub e164: String,
    /// Storage identity derived from `e164`
    pub key: PhoneKey,
}

/// Phone and address canonicalization with phone key derivation
pub struct Canonicalizer {
    phones: PhoneCanonicalizer,
    hasher: PhoneHasher,
}

impl Canonicalizer {
    pub fn new(phones: PhoneCanonicalizer, hasher: PhoneHasher) -> Self {
        Self { phones, hasher }
    }

    /// Build from the allowed countries and the phone hash key
    pub fn from_config(config: &VerificationConfig) -> DomainResult<Self> {
        Ok(Self::new(
            PhoneCanonicalizer::new(config.allowed_countries.as_slice()),
            PhoneHasher::new(config.phone_hash_key.as_bytes())?,
        ))
    }

    /// Canonical E.164 phone plus its storage key
    pub fn phone(&self, raw_phone: &str) -> DomainResult<CanonicalPhone> {
        let e164 = self.phones.canonicalize(raw_phone)?;
        let key = self.hasher.phone_key(&e164)?;
        Ok(CanonicalPhone { e164, key })
    }

    /// Rate-limit key for a remote address
    pub fn ip(&self, remote_addr: &str) -> DomainResult<IpKey> {
        canonical_ip(remote_addr).map(IpKey::new)
    }
}
