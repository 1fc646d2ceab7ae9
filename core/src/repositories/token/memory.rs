//! In-memory implementation of RefreshTokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::session::RevocationReason;
use crate::domain::entities::token::RefreshToken;
use crate::errors::DomainError;

use super::r#trait::RefreshTokenRepository;

/// Tokens keyed by hash
#[derive(Clone, Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: Arc<RwLock<HashMap<String, RefreshToken>>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All tokens belonging to a session
    pub async fn find_by_session(&self, session_id: Uuid) -> Vec<RefreshToken> {
        self.tokens
            .read()
            .await
            .values()
            .filter(|t| t.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Overwrite a stored token (test setup only)
    pub async fn put(&self, token: RefreshToken) {
        self.tokens.write().await.insert(token.token_hash.clone(), token);
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(&self, token: &RefreshToken) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token_hash) {
            return Err(DomainError::internal("Refresh token hash collision"));
        }
        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        Ok(self.tokens.read().await.get(token_hash).cloned())
    }

    async fn rotate(&self, old_hash: &str, successor: &RefreshToken) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&successor.token_hash) {
            return Err(DomainError::internal("Refresh token hash collision"));
        }
        let rotated = tokens
            .get_mut(old_hash)
            .map(|old| {
                old.revoke(RevocationReason::Rotated, Some(successor.token_hash.clone()))
            })
            .unwrap_or(false);
        if rotated {
            tokens.insert(successor.token_hash.clone(), successor.clone());
        }
        Ok(rotated)
    }

    async fn revoke_by_session(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut revoked = 0;
        for token in tokens.values_mut().filter(|t| t.session_id == session_id) {
            if token.revoke(reason, None) {
                token.revoked_at = Some(at);
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        let len = tokens.len();
        tokens.retain(|_, t| t.expires_at >= before);
        Ok((len - tokens.len()) as u64)
    }
}
