//! Main verification flow implementation

use std::sync::Arc;
use tracing::{error, info, warn};

use sv_shared::phone::mask_phone;

use super::config::VerificationServiceConfig;
use super::traits::{IssuanceSigner, SmsSender};
use super::types::SendCodeResult;
use crate::errors::{DomainError, VerificationError};
use crate::services::canonical::{CanonicalPhone, Canonicalizer};
use crate::services::rate_limit::{RateLimitDecision, RateLimiter};
use crate::services::token::{TokenManager, VerifyOutcome};

type VerificationResult<T> = Result<T, VerificationError>;

/// Verification flow over injected components.
///
/// Storage failures surface as [`VerificationError::StorageUnavailable`]: a
/// rate-limit check that cannot reach storage denies, a verification that
/// cannot reach storage is refused.
pub struct VerificationService {
    canonicalizer: Arc<Canonicalizer>,
    rate_limiter: Arc<RateLimiter>,
    token_manager: Arc<TokenManager>,
    sender: Arc<dyn SmsSender>,
    config: VerificationServiceConfig,
}

impl VerificationService {
    pub fn new(
        canonicalizer: Arc<Canonicalizer>,
        rate_limiter: Arc<RateLimiter>,
        token_manager: Arc<TokenManager>,
        sender: Arc<dyn SmsSender>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            canonicalizer,
            rate_limiter,
            token_manager,
            sender,
            config,
        }
    }

    /// Check and count a request from `remote_addr` for `raw_phone`
    pub async fn check_rate_limit(
        &self,
        remote_addr: &str,
        raw_phone: &str,
    ) -> VerificationResult<RateLimitDecision> {
        let phone = self.canonical_phone(raw_phone)?;
        let ip = self.canonicalizer.ip(remote_addr).map_err(fail_closed)?;
        self.rate_limiter
            .check(&ip, &phone.key)
            .await
            .map_err(fail_closed)
    }

    /// Generate and store a code for `raw_phone`
    pub async fn generate_token(&self, raw_phone: &str) -> VerificationResult<String> {
        let phone = self.canonical_phone(raw_phone)?;
        self.token_manager
            .generate(&phone.key)
            .await
            .map_err(fail_closed)
    }

    /// Check `code` for `raw_phone`; `Err` only for bad input or storage failure
    pub async fn verify_token(
        &self,
        raw_phone: &str,
        code: &str,
    ) -> VerificationResult<VerifyOutcome> {
        let phone = self.canonical_phone(raw_phone)?;
        self.token_manager
            .verify(&phone.key, code)
            .await
            .map_err(fail_closed)
    }

    /// Rate-limit, generate a code and send it by SMS
    ///
    /// # Returns
    ///
    /// * `Ok(SendCodeResult)` - the canonical phone and the sender number to show
    /// * `Err(RateLimited)` - with the milliseconds to wait
    pub async fn send_code(
        &self,
        remote_addr: &str,
        raw_phone: &str,
        language: Option<&str>,
    ) -> VerificationResult<SendCodeResult> {
        let phone = self.canonical_phone(raw_phone)?;
        let ip = self.canonicalizer.ip(remote_addr).map_err(fail_closed)?;

        let decision = self
            .rate_limiter
            .check(&ip, &phone.key)
            .await
            .map_err(fail_closed)?;
        if let RateLimitDecision::Denied { retry_after_ms } = decision {
            warn!(
                phone = %mask_phone(&phone.e164),
                retry_after_ms,
                event = "rate_limit_exceeded",
                "Verification code request denied"
            );
            return Err(VerificationError::RateLimited { retry_after_ms });
        }

        let token = self
            .token_manager
            .generate(&phone.key)
            .await
            .map_err(fail_closed)?;
        let message = self
            .config
            .render(language, &token, &phone.e164)
            .ok_or_else(|| {
                error!(language = ?language, "No SMS template configured");
                VerificationError::SendFailed
            })?;

        self.sender
            .send(&phone.e164, &message)
            .await
            .map_err(|e| {
                error!(phone = %mask_phone(&phone.e164), error = %e, "Failed to send SMS");
                VerificationError::SendFailed
            })?;

        info!(phone = %mask_phone(&phone.e164), "Verification code sent");
        Ok(SendCodeResult {
            phone: phone.e164,
            sender_number: self.config.sender_number.clone(),
        })
    }

    /// Verify `code` and return the canonical phone number it proves
    pub async fn verify_code(&self, raw_phone: &str, code: &str) -> VerificationResult<String> {
        let phone = self.canonical_phone(raw_phone)?;
        let outcome = self
            .token_manager
            .verify(&phone.key, code)
            .await
            .map_err(fail_closed)?;

        let failure = match outcome {
            VerifyOutcome::Verified => {
                info!(phone = %mask_phone(&phone.e164), "Phone number verified");
                return Ok(phone.e164);
            }
            VerifyOutcome::NotFound => VerificationError::TokenNotFound,
            VerifyOutcome::Expired => VerificationError::TokenExpired,
            VerifyOutcome::WrongCode => VerificationError::TokenMismatch,
            VerifyOutcome::TooManyTries => VerificationError::TokenTooManyTries,
        };
        warn!(
            phone = %mask_phone(&phone.e164),
            reason = failure.log_code(),
            "Verification failed"
        );
        Err(failure)
    }

    /// Verify `code` and have `signer` issue a credential for the phone
    pub async fn verify_and_issue(
        &self,
        raw_phone: &str,
        code: &str,
        signer: &dyn IssuanceSigner,
    ) -> VerificationResult<String> {
        let phone = self.verify_code(raw_phone, code).await?;
        signer.sign_issuance(&phone).map_err(|e| {
            error!(phone = %mask_phone(&phone), error = %e, "Failed to sign issuance");
            VerificationError::IssuanceFailed
        })
    }

    fn canonical_phone(&self, raw_phone: &str) -> VerificationResult<CanonicalPhone> {
        self.canonicalizer.phone(raw_phone).map_err(|e| match e {
            DomainError::Verification(err) => err,
            other => {
                error!(error = %other, "Failed to derive phone key");
                VerificationError::StorageUnavailable
            }
        })
    }
}

/// Map a non-verification failure to a refusal
fn fail_closed(err: DomainError) -> VerificationError {
    if err.is_storage() {
        error!(error = %err, "Storage unavailable, failing closed");
    } else {
        error!(error = %err, "Internal error, failing closed");
    }
    err.into_verification()
}
