//! Business services containing the verification core.

pub mod canonical;
pub mod cleanup;
pub mod clock;
pub mod rate_limit;
pub mod token;
pub mod verification;

// Re-export commonly used types
pub use canonical::{canonical_ip, CanonicalPhone, Canonicalizer, PhoneCanonicalizer, PhoneHasher};
pub use cleanup::{CleanupResult, CleanupService};
pub use clock::{Clock, ManualClock, SystemClock};
pub use rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimitSweep, RateLimiter};
pub use token::{TokenConfig, TokenManager, VerifyOutcome};
pub use verification::{
    IssuanceSigner, SendCodeResult, SmsSender, VerificationService, VerificationServiceConfig,
};
