//! SMS provider configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Supported SMS providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    /// Log-only provider for development and tests
    #[default]
    Mock,
    /// Twilio Programmable Messaging
    Twilio,
}

impl std::str::FromStr for SmsProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(SmsProvider::Mock),
            "twilio" => Ok(SmsProvider::Twilio),
            other => Err(format!("Unknown SMS provider: {}", other)),
        }
    }
}

/// SMS dispatch configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SmsConfig {
    pub provider: SmsProvider,

    /// Twilio account SID
    #[serde(default)]
    pub account_sid: String,

    /// Twilio auth token
    #[serde(default)]
    pub auth_token: String,

    /// Sender number in E.164 format
    #[serde(default)]
    pub from_number: String,

    /// Attempts per message before giving up
    pub max_retries: u32,
}

impl SmsConfig {
    pub fn from_env() -> Self {
        Self {
            provider: env_or("SMS_PROVIDER", SmsProvider::Mock),
            account_sid: env_or("TWILIO_ACCOUNT_SID", String::new()),
            auth_token: env_or("TWILIO_AUTH_TOKEN", String::new()),
            from_number: env_or("TWILIO_FROM_NUMBER", String::new()),
            max_retries: env_or("SMS_MAX_RETRIES", 3),
        }
    }
}
