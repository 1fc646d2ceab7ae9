//! Twilio SMS Service Implementation
//!
//! Sends sign-in codes through the Twilio API with bounded retries and
//! exponential backoff. Client errors (4xx) are not retried.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use twilio::{Client, OutboundMessage};

use salon_shared::config::SmsConfig;
use salon_shared::phone::{is_valid_e164, mask_phone};

use crate::sms::sms_service::SmsService;
use crate::InfrastructureError;

/// Twilio's maximum body length
const MAX_MESSAGE_LENGTH: usize = 1600;

/// Twilio SMS service configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number (must be a Twilio number in E.164)
    pub from_number: String,
    /// Attempts per message, including the first
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
}

impl TwilioConfig {
    /// Build from the shared SMS settings
    pub fn from_sms_config(config: &SmsConfig) -> Result<Self, InfrastructureError> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(InfrastructureError::Config(
                "TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN must be set".to_string(),
            ));
        }
        if !is_valid_e164(&config.from_number) {
            return Err(InfrastructureError::Config(
                "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        Ok(Self {
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            max_retries: config.max_retries.max(1),
            retry_delay_ms: 500,
        })
    }
}

/// Twilio SMS service implementation
pub struct TwilioSmsService {
    client: Client,
    config: TwilioConfig,
}

impl TwilioSmsService {
    pub fn new(config: TwilioConfig) -> Self {
        let client = Client::new(&config.account_sid, &config.auth_token);

        info!(
            from = %mask_phone(&config.from_number),
            "Twilio SMS service initialized"
        );

        Self { client, config }
    }

    async fn send_with_retry(&self, to: &str, message: &str) -> Result<String, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                attempt = attempts,
                max_retries = self.config.max_retries,
                phone = %mask_phone(to),
                "Sending SMS via Twilio"
            );

            let msg = OutboundMessage::new(&self.config.from_number, to, message);

            match self.client.send_message(msg).await {
                Ok(response) => {
                    info!(
                        phone = %mask_phone(to),
                        message_sid = %response.sid,
                        "SMS sent via Twilio"
                    );
                    return Ok(response.sid);
                }
                Err(e) => {
                    let error_msg = e.to_string();
                    error!(
                        attempt = attempts,
                        max_retries = self.config.max_retries,
                        error = %error_msg,
                        "Twilio send failed"
                    );

                    if attempts >= self.config.max_retries {
                        return Err(InfrastructureError::Sms(format!(
                            "Failed to send SMS after {} attempts: {}",
                            attempts, error_msg
                        )));
                    }

                    if is_client_error(&error_msg) {
                        return Err(InfrastructureError::Sms(format!(
                            "Invalid request: {}",
                            error_msg
                        )));
                    }

                    warn!(delay_ms = delay.as_millis() as u64, "Retrying Twilio send");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

/// Whether a Twilio error string describes a non-retryable 4xx other than 429
fn is_client_error(error_msg: &str) -> bool {
    if error_msg.contains("429") || error_msg.to_lowercase().contains("rate") {
        return false;
    }
    error_msg.contains("400")
        || error_msg.contains("401")
        || error_msg.contains("403")
        || error_msg.contains("404")
        || error_msg.to_lowercase().contains("invalid")
}

#[async_trait]
impl SmsService for TwilioSmsService {
    async fn send_sms(&self, phone_number: &str, message: &str) -> Result<String, InfrastructureError> {
        if !is_valid_e164(phone_number) {
            return Err(InfrastructureError::Sms(format!(
                "Invalid phone number format: {}",
                mask_phone(phone_number)
            )));
        }

        if message.len() > MAX_MESSAGE_LENGTH {
            return Err(InfrastructureError::Sms(format!(
                "Message exceeds maximum length of {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }

        self.send_with_retry(phone_number, message).await
    }

    fn provider_name(&self) -> &str {
        "Twilio"
    }
}
