//! Collaborators the verification flow depends on

use async_trait::async_trait;

/// Delivers an SMS body to a canonical phone number
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `message` to `phone` (E.164)
    async fn send(&self, phone: &str, message: &str) -> Result<(), String>;
}

/// Turns a verified phone number into a signed credential-issuance artifact
pub trait IssuanceSigner: Send + Sync {
    fn sign_issuance(&self, phone: &str) -> Result<String, String>;
}
