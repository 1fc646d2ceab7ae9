//! SMS Service Interface
//!
//! Provider-facing trait for delivering text messages. The auth core only sees
//! `SmsSender`; `SmsSenderAdapter` bridges the two.

use async_trait::async_trait;

use crate::InfrastructureError;

/// SMS service trait for sending text messages
///
/// Implementations include:
/// - Twilio Programmable Messaging
/// - Mock implementation for development
#[async_trait]
pub trait SmsService: Send + Sync {
    /// Send an SMS message to an E.164 phone number
    ///
    /// # Returns
    ///
    /// * `Ok(message_id)` - Provider identifier for the sent message
    /// * `Err(InfrastructureError)` - If sending fails
    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<String, InfrastructureError>;

    /// Send a sign-in code using the standard message text
    async fn send_verification_code(
        &self,
        phone_number: &str,
        code: &str,
    ) -> Result<String, InfrastructureError> {
        self.send_sms(phone_number, &verification_message(code)).await
    }

    /// Provider name for logs (e.g., "Twilio", "Mock")
    fn provider_name(&self) -> &str;

    /// Health check. Default implementation always returns true.
    async fn is_available(&self) -> bool {
        true
    }
}

/// Body of the sign-in SMS
pub fn verification_message(code: &str) -> String {
    format!(
        "Your salon sign-in code is {}. Do not share this code with anyone.",
        code
    )
}
