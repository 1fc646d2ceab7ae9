//! Mock SMS Service Implementation
//!
//! Logs messages instead of sending them. Used in development and whenever the
//! configured provider cannot be initialized outside production.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use salon_shared::phone::{is_valid_e164, mask_phone};

use super::sms_service::SmsService;
use crate::InfrastructureError;

/// Mock SMS service for development and testing
#[derive(Clone)]
pub struct MockSmsService {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Whether to simulate failures (for testing)
    simulate_failure: Arc<AtomicBool>,
    /// Whether to log the full message body, including the code
    log_body: bool,
}

impl MockSmsService {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    /// Create a mock service with configurable options
    pub fn with_options(log_body: bool, simulate_failure: bool) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            simulate_failure: Arc::new(AtomicBool::new(simulate_failure)),
            log_body,
        }
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Reset the message counter
    pub fn reset_counter(&self) {
        self.message_count.store(0, Ordering::SeqCst);
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

impl Default for MockSmsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsService for MockSmsService {
    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<String, InfrastructureError> {
        let masked_phone = mask_phone(phone_number);

        if !is_valid_e164(phone_number) {
            return Err(InfrastructureError::Sms(format!(
                "Invalid phone number format: {}",
                masked_phone
            )));
        }

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(
                provider = "mock",
                phone = %masked_phone,
                "Mock SMS service simulating failure"
            );
            return Err(InfrastructureError::Sms(
                "Simulated SMS sending failure".to_string(),
            ));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.log_body {
            // Development only: the body carries the code
            info!(
                target: "sms_service",
                provider = "mock",
                phone = %masked_phone,
                message_id = %message_id,
                count,
                body = %message,
                "Mock SMS"
            );
        } else {
            info!(
                target: "sms_service",
                provider = "mock",
                phone = %masked_phone,
                message_id = %message_id,
                message_length = message.len(),
                "SMS sent successfully (mock)"
            );
        }

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }

    async fn is_available(&self) -> bool {
        !self.simulate_failure.load(Ordering::SeqCst)
    }
}
