//! Shared utilities and common types for the salon server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error and response envelopes
//! - Phone number normalization and masking

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CleanupConfig, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    LoggingConfig, OtpConfig, ServerConfig, SmsConfig, SmsProvider, SurfaceTokenConfig,
    SurfaceTokenTtls,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{ApiResponse, HealthResponse};
pub use utils::phone;
