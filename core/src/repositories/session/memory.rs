//! In-memory implementation of SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::session::{RevocationReason, Session};
use crate::domain::entities::surface::Surface;
use crate::errors::DomainError;

use super::r#trait::SessionRepository;

#[derive(Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Backdate a revocation, for exercising cleanup cut-offs
    pub async fn force_revoked_at(&self, id: Uuid, at: DateTime<Utc>) {
        if let Some(session) = self.sessions.write().await.get_mut(&id) {
            session.revoked_at = Some(at);
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &Session) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(DomainError::internal("Session already exists"));
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(session) if session.is_active => {
                session.last_used_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke(
        &self,
        id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(&id) else {
            return Ok(false);
        };
        if !session.revoke(reason) {
            return Ok(false);
        }
        session.revoked_at = Some(at);
        Ok(true)
    }

    async fn expire_idle(
        &self,
        surface: Surface,
        idle_before: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let mut sessions = self.sessions.write().await;
        let mut expired = 0;
        for session in sessions
            .values_mut()
            .filter(|s| s.surface == surface && s.last_used_at < idle_before)
        {
            if session.revoke(RevocationReason::Expired) {
                session.revoked_at = Some(at);
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn delete_revoked_before(&self, before: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut sessions = self.sessions.write().await;
        let len = sessions.len();
        sessions.retain(|_, s| s.is_active || s.revoked_at.map_or(true, |at| at >= before));
        Ok((len - sessions.len()) as u64)
    }
}
