//! Challenge repository trait defining persistence for OTP challenges.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::challenge::{LockReason, OtpChallenge};
use crate::errors::DomainError;

/// Repository trait for OtpChallenge persistence
///
/// The store is the serialization point for concurrent requests. Every state
/// transition is conditional on the challenge still being `ACTIVE`, so that of two
/// racing verifications at most one observes success.
///
/// # Invariants
/// - At most one `ACTIVE` challenge exists per (phone, surface)
/// - `USED` and `LOCKED` are terminal
#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    /// Lock every `ACTIVE` challenge for the same (phone, surface) with reason
    /// `superseded`, then insert `challenge`, atomically.
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of challenges superseded
    async fn replace_active(&self, challenge: &OtpChallenge) -> Result<u64, DomainError>;

    /// Find a challenge by id regardless of status
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OtpChallenge>, DomainError>;

    /// Increment `attempts` on an `ACTIVE` challenge, locking it with reason
    /// `max-attempts` when the limit is reached.
    ///
    /// # Returns
    /// * `Ok(Some(OtpChallenge))` - The challenge after the update
    /// * `Ok(None)` - The challenge was not `ACTIVE`
    async fn record_failed_attempt(&self, id: Uuid) -> Result<Option<OtpChallenge>, DomainError>;

    /// Transition `ACTIVE -> USED`. Returns `false` if the challenge was no longer
    /// `ACTIVE` or had exhausted its attempts.
    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Transition `ACTIVE -> LOCKED`. Returns `false` if already terminal.
    async fn lock(&self, id: Uuid, reason: LockReason) -> Result<bool, DomainError>;

    /// Lock `old_id` with reason `rotated` and insert `replacement`, atomically.
    /// Returns `false` (and inserts nothing) if `old_id` was no longer `ACTIVE`.
    async fn rotate(&self, old_id: Uuid, replacement: &OtpChallenge) -> Result<bool, DomainError>;

    /// Delete challenges that expired before `before`
    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, DomainError>;
}
