//! Code generation and comparison

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};

use crate::domain::CODE_LENGTH;

/// Characters a generated code may contain.
///
/// `0`, `1`, `I` and `O` never appear; they are replaced by `W`, `Y`, `Z`
/// and `X` so a code can be read back without ambiguity.
pub const CODE_ALPHABET: &str = "23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

const BASE32_DIGITS: &[u8; 32] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV";
const CODE_BITS: u32 = 30;

/// Generate a new code from the operating system RNG
pub fn generate_code() -> String {
    let value: u32 = OsRng.gen_range(0..1u32 << CODE_BITS);
    encode_code(value)
}

/// Base-32 encode the low 30 bits of `value`, zero-pad to six characters and
/// replace the ambiguous characters
pub fn encode_code(value: u32) -> String {
    let mut remaining = value & ((1u32 << CODE_BITS) - 1);
    let mut digits = [b'0'; CODE_LENGTH];
    for slot in digits.iter_mut().rev() {
        *slot = BASE32_DIGITS[(remaining % 32) as usize];
        remaining /= 32;
    }

    digits
        .iter()
        .map(|&digit| match digit {
            b'0' => 'W',
            b'O' => 'X',
            b'1' => 'Y',
            b'I' => 'Z',
            other => other as char,
        })
        .collect()
}

/// Compare two codes without an early exit on the first differing byte
pub fn constant_time_compare(expected: &str, supplied: &str) -> bool {
    if expected.len() != supplied.len() {
        return false;
    }
    constant_time_eq(expected.as_bytes(), supplied.as_bytes())
}
