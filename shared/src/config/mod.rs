//! Configuration module with business-specific sub-modules
//!
//! - `auth` - JWT, token lifetimes, OTP limits and the admin allow-list
//! - `cleanup` - Background reaping of expired records
//! - `database` - MySQL pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server and CORS configuration
//! - `sms` - SMS provider selection and credentials

pub mod auth;
pub mod cleanup;
pub mod database;
pub mod environment;
pub mod server;
pub mod sms;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// Re-export commonly used types
pub use auth::{AuthConfig, JwtConfig, OtpConfig, SurfaceTokenConfig, SurfaceTokenTtls};
pub use cleanup::CleanupConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LoggingConfig};
pub use server::{CorsConfig, ServerConfig};
pub use sms::{SmsConfig, SmsProvider};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub sms: SmsConfig,
    pub cors: CorsConfig,
    pub cleanup: CleanupConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            sms: SmsConfig::from_env(),
            cors: CorsConfig::from_env(),
            cleanup: CleanupConfig::from_env(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Validate settings that would make the server unsafe to start
    pub fn validate(&self) -> Result<(), String> {
        if self.environment.is_production() && self.database.in_memory {
            return Err("DATABASE_IN_MEMORY cannot be used in production".to_string());
        }
        self.auth.validate(self.environment)
    }
}

/// Read and parse an environment variable, falling back to `default` when unset or malformed
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
