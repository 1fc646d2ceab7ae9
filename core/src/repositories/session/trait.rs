//! Session repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::session::{RevocationReason, Session};
use crate::domain::entities::surface::Surface;
use crate::errors::DomainError;

/// Repository trait for Session persistence
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session
    async fn create(&self, session: &Session) -> Result<(), DomainError>;

    /// Find a session by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, DomainError>;

    /// Update `last_used_at` on an active session. Returns `false` if the session
    /// is missing or inactive.
    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Mark an active session inactive. Returns `false` if it was already inactive.
    async fn revoke(
        &self,
        id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Mark active `surface` sessions last used before `idle_before` as expired.
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of sessions expired
    async fn expire_idle(
        &self,
        surface: Surface,
        idle_before: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Delete sessions revoked before `before`
    async fn delete_revoked_before(&self, before: DateTime<Utc>) -> Result<u64, DomainError>;
}
