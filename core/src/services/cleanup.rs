//! Cleanup service for periodic maintenance of rate-limit state and codes
//!
//! Runs the three expiry sweeps on a fixed interval, independent of request
//! traffic. A run never overlaps with another one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use sv_shared::CleanupConfig;

use crate::services::rate_limit::RateLimiter;
use crate::services::token::TokenManager;

/// Service sweeping stale IP state, stale phone state and expired codes
pub struct CleanupService {
    rate_limiter: Arc<RateLimiter>,
    token_manager: Arc<TokenManager>,
    config: CleanupConfig,
    running: AtomicBool,
}

impl CleanupService {
    pub fn new(
        rate_limiter: Arc<RateLimiter>,
        token_manager: Arc<TokenManager>,
        config: CleanupConfig,
    ) -> Self {
        Self {
            rate_limiter,
            token_manager,
            config,
            running: AtomicBool::new(false),
        }
    }

    /// Run a single cleanup cycle
    ///
    /// A failing sweep is recorded in [`CleanupResult::errors`] and does not
    /// stop the others. Returns a skipped result if a cycle is already running.
    pub async fn run_cleanup(&self) -> CleanupResult {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            warn!("Cleanup cycle still running, skipping");
            return CleanupResult {
                skipped: true,
                ..Default::default()
            };
        };

        info!("Starting cleanup cycle");
        let mut result = CleanupResult::default();

        match self.rate_limiter.cleanup_ip_limits().await {
            Ok(count) => result.ip_limits_removed = count,
            Err(e) => {
                error!("Failed to clean up IP limits: {}", e);
                result.errors.push(format!("IP limit cleanup error: {}", e));
            }
        }

        match self.rate_limiter.cleanup_phone_limits().await {
            Ok(count) => result.phone_limits_removed = count,
            Err(e) => {
                error!("Failed to clean up phone limits: {}", e);
                result
                    .errors
                    .push(format!("Phone limit cleanup error: {}", e));
            }
        }

        match self.token_manager.periodic_cleanup().await {
            Ok(count) => result.tokens_removed = count,
            Err(e) => {
                error!("Failed to clean up expired codes: {}", e);
                result.errors.push(format!("Token cleanup error: {}", e));
            }
        }

        info!(
            "Cleanup completed - IP: {}, Phone: {}, Tokens: {}",
            result.ip_limits_removed, result.phone_limits_removed, result.tokens_removed
        );

        result
    }

    /// Start the cleanup service as a background task
    ///
    /// This spawns a tokio task that runs cleanup at regular intervals
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Cleanup service is disabled");
            return None;
        }

        if self.config.interval_seconds == 0 {
            error!("Cleanup interval must be positive, background cleanup not started");
            return None;
        }
        let interval = Duration::from_secs(self.config.interval_seconds);

        Some(tokio::spawn(async move {
            info!(
                "Cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately
            interval_timer.tick().await;

            loop {
                interval_timer.tick().await;

                let result = self.run_cleanup().await;
                if !result.errors.is_empty() {
                    warn!("Cleanup completed with errors: {:?}", result.errors);
                }
            }
        }))
    }
}

/// Marks a cycle as running; cleared on drop, including when the cycle's
/// future is abandoned midway
struct RunGuard<'a> {
    running: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(running: &'a AtomicBool) -> Option<Self> {
        running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { running })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupResult {
    pub ip_limits_removed: usize,
    pub phone_limits_removed: usize,
    pub tokens_removed: usize,
    /// Another cycle was in progress, nothing was done
    pub skipped: bool,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get total number of items cleaned up
    pub fn total_cleaned(&self) -> usize {
        self.ip_limits_removed + self.phone_limits_removed + self.tokens_removed
    }
}
