//! Sender that writes messages to the log instead of a gateway
//!
//! Meant for development and tests. The phone number is masked; the body is
//! only logged at debug level since it carries the code.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info, warn};

use sv_core::services::SmsSender;
use sv_shared::phone::mask_phone;

#[derive(Debug, Default)]
pub struct LoggingSender {
    /// Messages accepted so far
    message_count: AtomicU64,
    /// Reject every send (to exercise the failure path)
    simulate_failure: AtomicBool,
}

impl LoggingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender that rejects every message
    pub fn failing() -> Self {
        let sender = Self::new();
        sender.set_simulate_failure(true);
        sender
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl SmsSender for LoggingSender {
    async fn send(&self, phone: &str, message: &str) -> Result<(), String> {
        let masked = mask_phone(phone);

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(provider = "log", phone = %masked, "Simulating SMS send failure");
            return Err("simulated SMS sending failure".to_string());
        }

        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            target: "sms_service",
            provider = "log",
            phone = %masked,
            message_number = count,
            message_length = message.len(),
            "SMS accepted"
        );
        debug!(target: "sms_service", body = %message, "SMS body");
        Ok(())
    }
}
