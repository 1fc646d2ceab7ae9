//! Shared error response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (field errors, remaining attempts, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Generic error codes not owned by a domain error
pub mod error_codes {
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNKNOWN_SURFACE: &str = "UNKNOWN_SURFACE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_detail() {
        let response = ErrorResponse::new("INVALID_OTP", "Invalid code").add_detail("remainingAttempts", 2);
        let details = response.details.unwrap();
        assert_eq!(details["remainingAttempts"], serde_json::json!(2));
    }

    #[test]
    fn test_details_skipped_when_empty() {
        let json = serde_json::to_value(ErrorResponse::new("X", "y")).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["error"], "X");
    }
}
