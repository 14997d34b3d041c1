//! Shared error codes

/// Error codes handed to the routing layer.
///
/// All token verification failures share [`CANNOT_VALIDATE_TOKEN`] so that a
/// caller cannot learn whether a code exists, expired or was guessed wrong.
pub mod error_codes {
    pub const ADDRESS_MALFORMED: &str = "error:address-malformed";
    pub const CANNOT_VALIDATE_TOKEN: &str = "error:cannot-validate-token";
    pub const RATE_LIMITED: &str = "error:ratelimit";
    pub const SENDING_SMS: &str = "error:sending-sms";
    pub const INTERNAL_ERROR: &str = "error:internal";
}
