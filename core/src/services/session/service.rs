//! Session service implementation

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::session::{RevocationReason, Session};
use crate::domain::entities::surface::Surface;
use crate::errors::{DomainResult, TokenError};
use crate::repositories::SessionRepository;

/// Creates, loads and revokes login sessions
pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Open a session for a successful login
    pub async fn create(
        &self,
        user_id: Uuid,
        surface: Surface,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> DomainResult<Session> {
        let session = Session::new(user_id, surface, ip, user_agent);
        self.repository.create(&session).await?;
        tracing::info!(
            session_id = %session.id,
            user_id = %user_id,
            surface = %surface,
            event = "session_created",
            "Session created"
        );
        Ok(session)
    }

    pub async fn find(&self, session_id: Uuid) -> DomainResult<Option<Session>> {
        self.repository.find_by_id(session_id).await
    }

    /// Load a session that must be active and owned by `user_id`
    pub async fn require_active_for(&self, session_id: Uuid, user_id: Uuid) -> DomainResult<Session> {
        let session = self
            .repository
            .find_by_id(session_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or(TokenError::SessionInvalid)?;

        if !session.belongs_to(user_id) {
            return Err(TokenError::SessionUserMismatch.into());
        }
        Ok(session)
    }

    /// Record activity on an active session
    pub async fn touch(&self, session: &mut Session) -> DomainResult<()> {
        let now = Utc::now();
        if !self.repository.touch(session.id, now).await? {
            return Err(TokenError::SessionInvalid.into());
        }
        session.last_used_at = now;
        Ok(())
    }

    /// The only mutation path for a session. Returns `false` if it was already inactive.
    pub async fn revoke(&self, session_id: Uuid, reason: RevocationReason) -> DomainResult<bool> {
        let revoked = self.repository.revoke(session_id, reason, Utc::now()).await?;
        if revoked {
            tracing::info!(
                session_id = %session_id,
                reason = %reason,
                event = "session_revoked",
                "Session revoked"
            );
        }
        Ok(revoked)
    }
}
