//! Unit tests for phone and address canonicalization

use crate::errors::VerificationError;
use crate::services::canonical::{canonical_ip, Canonicalizer, PhoneCanonicalizer, PhoneHasher};
use sv_shared::VerificationConfig;

const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

fn eu() -> PhoneCanonicalizer {
    PhoneCanonicalizer::new(&["NL", "DE", "UK"])
}

#[test]
fn test_dutch_mobile_is_e164() {
    assert_eq!(eu().canonicalize("+31612345678").unwrap(), "+31612345678");
    assert_eq!(eu().canonicalize(" +31 6 1234 5678 ").unwrap(), "+31612345678");
}

#[test]
fn test_uk_alias_accepts_gb_numbers() {
    assert!(eu().is_allowed_region("GB"));
    assert_eq!(eu().canonicalize("+447911123456").unwrap(), "+447911123456");
}

#[test]
fn test_missing_plus_rejected() {
    assert_eq!(
        eu().canonicalize("0612345678"),
        Err(VerificationError::InvalidPhoneNumber)
    );
}

#[test]
fn test_unapproved_country_rejected() {
    assert_eq!(
        eu().canonicalize("+12025550123"),
        Err(VerificationError::InvalidPhoneNumber)
    );
}

#[test]
fn test_fixed_line_rejected() {
    // Amsterdam landline
    assert_eq!(
        eu().canonicalize("+31201234567"),
        Err(VerificationError::InvalidPhoneNumber)
    );
}

#[test]
fn test_garbage_rejected() {
    assert!(eu().canonicalize("+").is_err());
    assert!(eu().canonicalize("+31abc").is_err());
}

#[test]
fn test_ipv4_verbatim() {
    assert_eq!(canonical_ip("192.0.2.17").unwrap(), "192.0.2.17");
}

#[test]
fn test_ipv4_mapped_ipv6_keyed_as_ipv4() {
    let first = canonical_ip("::ffff:192.0.2.1").unwrap();
    let second = canonical_ip("[::ffff:198.51.100.7]").unwrap();

    assert_eq!(first, "192.0.2.1");
    assert_eq!(second, "198.51.100.7");
    assert_ne!(first, second);
    assert_eq!(first, canonical_ip("192.0.2.1").unwrap());
}

#[test]
fn test_ipv6_truncated_to_56() {
    assert_eq!(
        canonical_ip("2001:db8:abcd:12ff:1:2:3:4").unwrap(),
        "2001:db8:abcd:1200::"
    );
    assert_eq!(
        canonical_ip("[2001:db8:abcd:1234::1]").unwrap(),
        canonical_ip("2001:db8:abcd:12aa::2").unwrap()
    );
}

#[test]
fn test_unparseable_ip_is_internal_error() {
    let err = canonical_ip("not-an-ip").unwrap_err();
    assert!(matches!(err, crate::errors::DomainError::Internal { .. }));
}

#[test]
fn test_phone_key_is_stable_and_keyed() {
    let hasher = PhoneHasher::new(KEY).unwrap();
    let a = hasher.phone_key("+31612345678").unwrap();
    let b = hasher.phone_key("+31612345678").unwrap();
    assert_eq!(a, b);
    assert!(!a.as_str().contains("31612345678"));

    let other = PhoneHasher::new(b"fedcba9876543210fedcba9876543210").unwrap();
    assert_ne!(other.phone_key("+31612345678").unwrap(), a);
}

#[test]
fn test_short_hash_key_rejected() {
    assert!(PhoneHasher::new(b"short").is_err());
}

#[test]
fn test_canonicalizer_from_config() {
    let config = VerificationConfig {
        phone_hash_key: String::from_utf8(KEY.to_vec()).unwrap(),
        ..Default::default()
    };
    let canonicalizer = Canonicalizer::from_config(&config).unwrap();

    let spaced = canonicalizer.phone("+31 6 12345678").unwrap();
    let compact = canonicalizer.phone("+31612345678").unwrap();
    assert_eq!(spaced, compact);
    assert_eq!(compact.e164, "+31612345678");
    assert_eq!(canonicalizer.ip("10.0.0.1").unwrap().as_str(), "10.0.0.1");
}
