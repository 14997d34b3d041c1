//! Types for verification flow results

/// Result of sending a verification code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCodeResult {
    /// Canonical phone the code was sent to
    pub phone: String,
    /// Number the SMS appears to come from, shown to the user
    pub sender_number: String,
}
