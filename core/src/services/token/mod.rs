//! One-time code management.
//!
//! Codes are six characters drawn from a 30-bit random value, stored per
//! phone key and verified in constant time. Only the newest code for a phone
//! is valid and a verified code cannot be used twice.

mod config;
mod generator;
mod manager;

#[cfg(test)]
mod tests;

pub use config::TokenConfig;
pub use generator::{constant_time_compare, encode_code, generate_code, CODE_ALPHABET};
pub use manager::{assess, TokenManager, VerifyOutcome};
