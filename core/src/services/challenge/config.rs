//! Configuration for the challenge service

use salon_shared::config::{Environment, OtpConfig};

use crate::domain::entities::challenge::is_well_formed_code;

/// Configuration for the challenge service
#[derive(Debug, Clone)]
pub struct ChallengeServiceConfig {
    /// Challenge lifetime in seconds
    pub ttl_seconds: i64,
    /// Wrong codes allowed per challenge
    pub max_attempts: i32,
    /// Resends allowed per challenge chain
    pub max_resends: i32,
    /// bcrypt cost for code hashes
    pub bcrypt_cost: u32,
    /// Fixed code used instead of a random one. Never set in production.
    pub test_code: Option<String>,
}

impl Default for ChallengeServiceConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            max_attempts: 5,
            max_resends: 3,
            bcrypt_cost: 10,
            test_code: None,
        }
    }
}

impl ChallengeServiceConfig {
    /// Build from the shared OTP configuration for the running environment
    pub fn from_otp_config(otp: &OtpConfig, environment: Environment) -> Self {
        let test_code = otp.test_code_for(environment).and_then(|code| {
            if is_well_formed_code(code) {
                Some(code.to_string())
            } else {
                tracing::warn!("OTP_TEST_CODE must be six digits; ignoring it");
                None
            }
        });

        Self {
            ttl_seconds: otp.ttl_seconds,
            max_attempts: otp.max_attempts,
            max_resends: otp.max_resends,
            bcrypt_cost: otp.effective_bcrypt_cost(environment),
            test_code,
        }
    }
}
