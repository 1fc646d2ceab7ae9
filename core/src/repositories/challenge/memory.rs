//! In-memory implementation of ChallengeRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::challenge::{LockReason, OtpChallenge};
use crate::errors::DomainError;

use super::r#trait::ChallengeRepository;

/// In-memory challenge repository. A single write lock makes every method atomic.
#[derive(Clone, Default)]
pub struct InMemoryChallengeRepository {
    challenges: Arc<RwLock<HashMap<Uuid, OtpChallenge>>>,
}

impl InMemoryChallengeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored challenge
    pub async fn all(&self) -> Vec<OtpChallenge> {
        self.challenges.read().await.values().cloned().collect()
    }

    /// Overwrite a stored challenge (test setup only)
    pub async fn put(&self, challenge: OtpChallenge) {
        self.challenges.write().await.insert(challenge.id, challenge);
    }

    fn supersede(map: &mut HashMap<Uuid, OtpChallenge>, challenge: &OtpChallenge) -> u64 {
        let mut superseded = 0;
        for existing in map.values_mut() {
            if existing.id != challenge.id
                && existing.phone == challenge.phone
                && existing.surface == challenge.surface
                && existing.lock(LockReason::Superseded)
            {
                superseded += 1;
            }
        }
        superseded
    }
}

#[async_trait]
impl ChallengeRepository for InMemoryChallengeRepository {
    async fn replace_active(&self, challenge: &OtpChallenge) -> Result<u64, DomainError> {
        let mut map = self.challenges.write().await;
        let superseded = Self::supersede(&mut map, challenge);
        map.insert(challenge.id, challenge.clone());
        Ok(superseded)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OtpChallenge>, DomainError> {
        Ok(self.challenges.read().await.get(&id).cloned())
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<Option<OtpChallenge>, DomainError> {
        let mut map = self.challenges.write().await;
        match map.get_mut(&id) {
            Some(challenge) => {
                if challenge.record_failed_attempt() {
                    Ok(Some(challenge.clone()))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut map = self.challenges.write().await;
        match map.get_mut(&id) {
            Some(challenge) if !challenge.attempts_exhausted() => Ok(challenge.mark_used()),
            _ => Ok(false),
        }
    }

    async fn lock(&self, id: Uuid, reason: LockReason) -> Result<bool, DomainError> {
        let mut map = self.challenges.write().await;
        Ok(map.get_mut(&id).map(|c| c.lock(reason)).unwrap_or(false))
    }

    async fn rotate(&self, old_id: Uuid, replacement: &OtpChallenge) -> Result<bool, DomainError> {
        let mut map = self.challenges.write().await;
        let locked = map
            .get_mut(&old_id)
            .map(|c| c.lock(LockReason::Rotated))
            .unwrap_or(false);
        if !locked {
            return Ok(false);
        }
        Self::supersede(&mut map, replacement);
        map.insert(replacement.id, replacement.clone());
        Ok(true)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut map = self.challenges.write().await;
        let len = map.len();
        map.retain(|_, c| c.expires_at >= before);
        Ok((len - map.len()) as u64)
    }
}
