//! Unit tests for code generation

use crate::domain::CODE_LENGTH;
use crate::services::token::{constant_time_compare, encode_code, generate_code, CODE_ALPHABET};

#[test]
fn test_zero_is_padded_and_replaced() {
    assert_eq!(encode_code(0), "WWWWWW");
}

#[test]
fn test_ambiguous_characters_replaced() {
    // 1 -> Y, I (18) -> Z, O (24) -> X
    assert_eq!(encode_code(1), "WWWWWY");
    assert_eq!(encode_code(18), "WWWWWZ");
    assert_eq!(encode_code(24), "WWWWWX");
    assert_eq!(encode_code(31), "WWWWWV");
}

#[test]
fn test_largest_value() {
    assert_eq!(encode_code((1 << 30) - 1), "VVVVVV");
}

#[test]
fn test_generated_codes_use_alphabet() {
    for _ in 0..500 {
        let code = generate_code();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(
            code.chars().all(|c| CODE_ALPHABET.contains(c)),
            "unexpected character in {}",
            code
        );
    }
}

#[test]
fn test_constant_time_compare() {
    assert!(constant_time_compare("AB2CDE", "AB2CDE"));
    assert!(!constant_time_compare("AB2CDE", "AB2CDF"));
    assert!(!constant_time_compare("AB2CDE", "AB2CD"));
    assert!(!constant_time_compare("AB2CDE", ""));
}
