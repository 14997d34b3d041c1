//! Token manager: generate, verify and sweep one-time codes

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::config::TokenConfig;
use super::generator::{constant_time_compare, generate_code};
use crate::domain::{PhoneKey, TokenRecord};
use crate::errors::DomainResult;
use crate::repositories::{Change, StorageBackend};
use crate::services::clock::Clock;

/// Result of checking a supplied code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code matched; the record has been deleted
    Verified,
    NotFound,
    /// Past the validity window; left for the sweep
    Expired,
    /// Code did not match; the try has been counted
    WrongCode,
    /// Too many wrong guesses; the code can no longer be used
    TooManyTries,
}

impl VerifyOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerifyOutcome::Verified)
    }
}

/// Decide what happens to `record` when `supplied` is checked at `now`.
///
/// Pure so that a backend may re-run it after a write conflict.
pub fn assess(
    record: Option<&TokenRecord>,
    supplied: &str,
    now: i64,
    config: &TokenConfig,
) -> (Change<TokenRecord>, VerifyOutcome) {
    let record = match record {
        Some(record) => record,
        None => return (Change::Keep, VerifyOutcome::NotFound),
    };

    if record.is_expired(now, config.validity_ms) {
        return (Change::Keep, VerifyOutcome::Expired);
    }

    if !constant_time_compare(&record.code, supplied) {
        let counted = record.with_failed_try();
        let outcome = if counted.tries > config.max_tries {
            VerifyOutcome::TooManyTries
        } else {
            VerifyOutcome::WrongCode
        };
        return (Change::Put(counted), outcome);
    }

    if record.tries > config.max_tries {
        return (Change::Keep, VerifyOutcome::TooManyTries);
    }

    (Change::Delete, VerifyOutcome::Verified)
}

/// Issues and checks one-time codes keyed by phone identity
pub struct TokenManager {
    store: Arc<dyn StorageBackend<TokenRecord>>,
    config: TokenConfig,
    clock: Arc<dyn Clock>,
}

impl TokenManager {
    pub fn new(
        store: Arc<dyn StorageBackend<TokenRecord>>,
        config: TokenConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Generate a code for `phone`, replacing any previous one
    pub async fn generate(&self, phone: &PhoneKey) -> DomainResult<String> {
        let code = generate_code();
        let record = TokenRecord::new(code.clone(), self.clock.now_millis());
        self.store.store(phone.as_str(), &record).await?;
        debug!(backend = self.store.backend_name(), "Verification code stored");
        Ok(code)
    }

    /// Check `supplied` against the active code for `phone`
    pub async fn verify(&self, phone: &PhoneKey, supplied: &str) -> DomainResult<VerifyOutcome> {
        let now = self.clock.now_millis();
        let config = &self.config;
        let updated = self
            .store
            .update(phone.as_str(), &|current| assess(current, supplied, now, config).0)
            .await?;

        // Re-derive the outcome from the state the applied change was computed on
        let (_, outcome) = assess(updated.previous.as_ref(), supplied, now, config);
        match outcome {
            VerifyOutcome::Verified => info!("Verification code accepted"),
            VerifyOutcome::NotFound => warn!("No verification code for phone"),
            VerifyOutcome::Expired => warn!("Verification code expired"),
            VerifyOutcome::WrongCode => warn!(
                tries = updated.previous.as_ref().map_or(0, |r| r.tries + 1),
                "Verification code is wrong"
            ),
            VerifyOutcome::TooManyTries => warn!("Verification code tried too often"),
        }
        Ok(outcome)
    }

    /// Remove every expired record
    pub async fn periodic_cleanup(&self) -> DomainResult<usize> {
        let now = self.clock.now_millis();
        let validity_ms = self.config.validity_ms;
        let removed = self
            .store
            .remove_expired(&|record| record.is_expired(now, validity_ms))
            .await?;
        debug!(removed, backend = self.store.backend_name(), "Expired codes swept");
        Ok(removed)
    }
}
