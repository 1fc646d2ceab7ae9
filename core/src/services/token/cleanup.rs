//! Periodic cleanup of expired challenges, refresh tokens and revoked sessions
//!
//! Records are only removed once they have been dead for longer than the
//! configured grace period, so recent revocations stay visible for reuse detection.
//! Sessions abandoned without logout are first expired once they have been idle
//! past their surface's refresh lifetime plus the grace period.

use std::sync::Arc;

use chrono::{Duration, Utc};
use salon_shared::{CleanupConfig, SurfaceTokenTtls};
use tracing::{error, info, warn};

use super::config::surface_ttl;
use crate::domain::entities::surface::Surface;
use crate::errors::DomainError;
use crate::repositories::{ChallengeRepository, RefreshTokenRepository, SessionRepository};

/// Service for reaping expired authentication records
pub struct CleanupService {
    challenges: Arc<dyn ChallengeRepository>,
    sessions: Arc<dyn SessionRepository>,
    tokens: Arc<dyn RefreshTokenRepository>,
    ttls: SurfaceTokenTtls,
    config: CleanupConfig,
}

impl CleanupService {
    pub fn new(
        challenges: Arc<dyn ChallengeRepository>,
        sessions: Arc<dyn SessionRepository>,
        tokens: Arc<dyn RefreshTokenRepository>,
        ttls: SurfaceTokenTtls,
        config: CleanupConfig,
    ) -> Self {
        Self {
            challenges,
            sessions,
            tokens,
            ttls,
            config,
        }
    }

    /// Run a single cleanup cycle
    ///
    /// Each store is cleaned independently; a failure in one is recorded in
    /// the result and does not stop the others.
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let now = Utc::now();
        let grace = Duration::seconds(self.config.grace_period_seconds);
        let cutoff = now - grace;
        let mut result = CleanupResult::default();

        match self.challenges.delete_expired(cutoff).await {
            Ok(count) => result.challenges_deleted = count,
            Err(e) => {
                error!(error = %e, "Failed to cleanup expired challenges");
                result.errors.push(format!("Challenge cleanup error: {}", e));
            }
        }

        match self.tokens.delete_expired(cutoff).await {
            Ok(count) => result.tokens_deleted = count,
            Err(e) => {
                error!(error = %e, "Failed to cleanup expired refresh tokens");
                result.errors.push(format!("Token cleanup error: {}", e));
            }
        }

        for surface in Surface::ALL {
            let refresh_ttl = surface_ttl(&self.ttls, surface).refresh_ttl_seconds;
            let idle_before = now - Duration::seconds(refresh_ttl) - grace;
            match self.sessions.expire_idle(surface, idle_before, now).await {
                Ok(count) => result.sessions_expired += count,
                Err(e) => {
                    error!(
                        error = %e,
                        surface = surface.as_str(),
                        "Failed to expire idle sessions"
                    );
                    result.errors.push(format!("Session expiry error: {}", e));
                }
            }
        }

        match self.sessions.delete_revoked_before(cutoff).await {
            Ok(count) => result.sessions_deleted = count,
            Err(e) => {
                error!(error = %e, "Failed to cleanup revoked sessions");
                result.errors.push(format!("Session cleanup error: {}", e));
            }
        }

        info!(
            challenges = result.challenges_deleted,
            tokens = result.tokens_deleted,
            sessions_expired = result.sessions_expired,
            sessions = result.sessions_deleted,
            event = "cleanup_completed",
            "Auth cleanup cycle completed"
        );

        Ok(result)
    }

    /// Spawn a tokio task that runs cleanup every `interval_seconds`
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Auth cleanup task is disabled");
            return;
        }

        let period = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "Auth cleanup task started"
            );

            let mut timer = tokio::time::interval(period);
            loop {
                timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) if !result.is_success() => {
                        warn!(errors = ?result.errors, "Cleanup completed with errors");
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "Cleanup cycle failed"),
                }
            }
        });
    }
}

/// Result of a cleanup cycle
#[derive(Debug, Default)]
pub struct CleanupResult {
    pub challenges_deleted: u64,
    pub tokens_deleted: u64,
    pub sessions_deleted: u64,
    /// Idle sessions marked expired this cycle; deleted once past the grace period
    pub sessions_expired: u64,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_cleaned(&self) -> u64 {
        self.challenges_deleted + self.tokens_deleted + self.sessions_deleted
    }
}
