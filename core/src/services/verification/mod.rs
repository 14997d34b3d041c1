//! Verification flow module
//!
//! Wires canonicalization, rate limiting and code management into the
//! operations a routing layer calls:
//! - send a code to a phone, after rate limiting
//! - verify a code and hand the canonical phone to an issuance signer

mod config;
mod service;
mod traits;
mod types;


pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use traits::{IssuanceSigner, SmsSender};
pub use types::SendCodeResult;
