//! bcrypt hashing for one-time codes

use crate::errors::{DomainError, DomainResult};

/// Slow one-way hash for OTP codes. Work runs on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct OtpHasher {
    cost: u32,
}

impl OtpHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, code: &str) -> DomainResult<String> {
        let code = code.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(code, cost))
            .await
            .map_err(|e| DomainError::internal(format!("OTP hashing task failed: {}", e)))?
            .map_err(|e| DomainError::internal(format!("Failed to hash OTP: {}", e)))
    }

    /// `false` for mismatches and for unreadable hashes
    pub async fn verify(&self, code: &str, hash: &str) -> DomainResult<bool> {
        let code = code.to_string();
        let hash = hash.to_string();
        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(code, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("OTP verification task failed: {}", e)))?;
        Ok(matched.unwrap_or(false))
    }
}
