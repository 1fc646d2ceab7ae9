//! SMS Service Module
//!
//! Delivers sign-in codes. Providers implement `SmsService`; the core sees
//! them through `SmsSenderAdapter`.
//!
//! - **Mock**: logs messages, used in development and tests
//! - **Twilio**: production delivery (feature `twilio-sms`)

pub mod adapter;
pub mod mock_sms;
pub mod sms_service;

#[cfg(feature = "twilio-sms")]
pub mod twilio;

// Re-export commonly used types
pub use adapter::SmsSenderAdapter;
pub use mock_sms::MockSmsService;
pub use sms_service::{verification_message, SmsService};

#[cfg(feature = "twilio-sms")]
pub use twilio::{TwilioConfig, TwilioSmsService};

use salon_shared::config::{SmsConfig, SmsProvider};

use crate::InfrastructureError;

#[cfg(test)]
mod tests;

/// Create an SMS service based on configuration
///
/// Falls back to the mock provider when the configured one cannot be
/// initialized, unless `strict` is set (production), in which case the
/// configuration error is returned.
pub fn create_sms_service(
    config: &SmsConfig,
    strict: bool,
) -> Result<Box<dyn SmsService>, InfrastructureError> {
    match config.provider {
        SmsProvider::Mock => Ok(Box::new(MockSmsService::new())),
        SmsProvider::Twilio => create_twilio(config, strict),
    }
}

#[cfg(feature = "twilio-sms")]
fn create_twilio(config: &SmsConfig, strict: bool) -> Result<Box<dyn SmsService>, InfrastructureError> {
    match TwilioConfig::from_sms_config(config) {
        Ok(twilio_config) => Ok(Box::new(TwilioSmsService::new(twilio_config))),
        Err(e) if strict => Err(e),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize Twilio SMS service");
            tracing::warn!("Falling back to mock SMS service");
            Ok(Box::new(MockSmsService::new()))
        }
    }
}

#[cfg(not(feature = "twilio-sms"))]
fn create_twilio(_config: &SmsConfig, strict: bool) -> Result<Box<dyn SmsService>, InfrastructureError> {
    if strict {
        return Err(InfrastructureError::Config(
            "SMS_PROVIDER=twilio requires the twilio-sms feature".to_string(),
        ));
    }
    tracing::warn!("twilio-sms feature disabled, using mock SMS service");
    Ok(Box::new(MockSmsService::new()))
}
