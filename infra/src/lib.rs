//! # Infrastructure Layer
//!
//! Concrete implementations of the salon auth core's collaborators:
//! - **Database**: MySQL repositories for challenges, sessions, refresh tokens,
//!   users and tenants using SQLx, plus the embedded migrations
//! - **SMS**: provider trait with mock and Twilio implementations, and the
//!   adapter that plugs them into the core `SmsSender`
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `twilio-sms`: Enable the Twilio SMS provider (default)

use salon_core::errors::DomainError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// SMS service module - External SMS providers
pub mod sms;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failure at startup
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// Stored data that cannot be mapped back to a domain value
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        tracing::error!(error = %err, "Infrastructure failure");
        DomainError::internal(err.to_string())
    }
}
