//! Refresh token repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::session::RevocationReason;
use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

/// Repository trait for RefreshToken persistence
///
/// # Security Considerations
/// - Only token hashes are stored; raw tokens never reach the repository
/// - Rotation is conditional on the predecessor being unrevoked, so a token can be
///   redeemed at most once even under concurrent requests
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a new refresh token record
    async fn create(&self, token: &RefreshToken) -> Result<(), DomainError>;

    /// Find a token record by the SHA-256 hash of the raw token
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Revoke `old_hash` (reason `rotated`, recording `successor.token_hash`) and
    /// insert `successor`, atomically.
    ///
    /// # Returns
    /// * `Ok(true)` - Rotation happened
    /// * `Ok(false)` - `old_hash` was missing or already revoked; nothing inserted
    async fn rotate(&self, old_hash: &str, successor: &RefreshToken) -> Result<bool, DomainError>;

    /// Revoke every unrevoked token of a session
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of tokens revoked
    async fn revoke_by_session(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Delete tokens that expired before `before`
    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, DomainError>;
}
