//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, ErrorCategory, TokenError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Shorthand for an internal failure with context
    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// Stable error code exposed to clients
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::Auth(e) => e.code(),
            DomainError::Token(e) => e.code(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DomainError::Validation { .. } => ErrorCategory::Validation,
            DomainError::Internal { .. } => ErrorCategory::Internal,
            DomainError::Auth(e) => e.category(),
            DomainError::Token(e) => e.category(),
        }
    }

    /// Message safe to show to clients. Internal details are never exposed.
    pub fn client_message(&self) -> String {
        match self.category() {
            ErrorCategory::Internal => "An internal error occurred".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
