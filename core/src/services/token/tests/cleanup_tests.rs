use std::sync::Arc;

use chrono::{Duration, Utc};
use salon_shared::{CleanupConfig, SurfaceTokenTtls};
use uuid::Uuid;

use crate::domain::entities::challenge::{ChallengeMeta, OtpChallenge};
use crate::domain::entities::session::{RevocationReason, Session};
use crate::domain::entities::surface::Surface;
use crate::domain::entities::token::RefreshToken;
use crate::repositories::{
    ChallengeRepository, InMemoryChallengeRepository, InMemoryRefreshTokenRepository,
    InMemorySessionRepository, RefreshTokenRepository, SessionRepository,
};
use crate::services::token::CleanupService;

struct Fixture {
    cleanup: CleanupService,
    challenges: Arc<InMemoryChallengeRepository>,
    sessions: Arc<InMemorySessionRepository>,
    tokens: Arc<InMemoryRefreshTokenRepository>,
}

fn fixture(config: CleanupConfig) -> Fixture {
    let challenges = Arc::new(InMemoryChallengeRepository::new());
    let sessions = Arc::new(InMemorySessionRepository::new());
    let tokens = Arc::new(InMemoryRefreshTokenRepository::new());
    let cleanup = CleanupService::new(
        challenges.clone(),
        sessions.clone(),
        tokens.clone(),
        SurfaceTokenTtls::default(),
        config,
    );
    Fixture {
        cleanup,
        challenges,
        sessions,
        tokens,
    }
}

fn challenge(expired_for: Duration) -> OtpChallenge {
    let mut c = OtpChallenge::new(
        "+15550001234".to_string(),
        Surface::SalonOwner,
        "hash".to_string(),
        300,
        5,
        0,
        ChallengeMeta::default(),
    );
    c.expires_at = Utc::now() - expired_for;
    c
}

#[tokio::test]
async fn test_cleanup_respects_grace_period() {
    let f = fixture(CleanupConfig {
        grace_period_seconds: 3600,
        ..Default::default()
    });

    f.challenges.put(challenge(Duration::hours(2))).await;
    f.challenges.put(challenge(Duration::minutes(5))).await;

    let session = Session::new(Uuid::new_v4(), Surface::Admin, None, None);
    let mut old_token = RefreshToken::new(
        session.user_id,
        session.id,
        Surface::Admin,
        "old".to_string(),
        60,
        None,
    );
    old_token.expires_at = Utc::now() - Duration::days(2);
    f.tokens.put(old_token).await;
    f.tokens
        .create(&RefreshToken::new(
            session.user_id,
            session.id,
            Surface::Admin,
            "fresh".to_string(),
            60,
            None,
        ))
        .await
        .unwrap();

    f.sessions.create(&session).await.unwrap();
    f.sessions
        .revoke(session.id, RevocationReason::Logout, Utc::now() - Duration::days(1))
        .await
        .unwrap();
    let live = Session::new(Uuid::new_v4(), Surface::Admin, None, None);
    f.sessions.create(&live).await.unwrap();

    let result = f.cleanup.run_cleanup().await.unwrap();
    assert!(result.is_success());
    assert_eq!(result.challenges_deleted, 1);
    assert_eq!(result.tokens_deleted, 1);
    assert_eq!(result.sessions_deleted, 1);
    assert_eq!(result.total_cleaned(), 3);

    assert_eq!(f.challenges.all().await.len(), 1);
    assert!(f.tokens.find_by_hash("fresh").await.unwrap().is_some());
    assert!(f.sessions.find_by_id(live.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_abandoned_sessions_expire_then_get_reaped() {
    let f = fixture(CleanupConfig {
        grace_period_seconds: 3600,
        ..Default::default()
    });

    // Admin refresh lifetime is one day; idle for three days without logout
    let mut abandoned = Session::new(Uuid::new_v4(), Surface::Admin, None, None);
    abandoned.last_used_at = Utc::now() - Duration::days(3);
    f.sessions.create(&abandoned).await.unwrap();

    // Same idle time is still inside the 30-day owner refresh lifetime
    let mut owner = Session::new(Uuid::new_v4(), Surface::SalonOwner, None, None);
    owner.last_used_at = Utc::now() - Duration::days(3);
    f.sessions.create(&owner).await.unwrap();

    let result = f.cleanup.run_cleanup().await.unwrap();
    assert!(result.is_success());
    assert_eq!(result.sessions_expired, 1);
    assert_eq!(result.sessions_deleted, 0);

    let expired = f.sessions.find_by_id(abandoned.id).await.unwrap().unwrap();
    assert!(!expired.is_active);
    assert_eq!(expired.revoked_reason, Some(RevocationReason::Expired));
    assert!(f.sessions.find_by_id(owner.id).await.unwrap().unwrap().is_active);

    // Once the expiry itself is older than the grace period the row is deleted
    f.sessions.force_revoked_at(abandoned.id, Utc::now() - Duration::hours(2)).await;
    let result = f.cleanup.run_cleanup().await.unwrap();
    assert_eq!(result.sessions_expired, 0);
    assert_eq!(result.sessions_deleted, 1);
    assert!(f.sessions.find_by_id(abandoned.id).await.unwrap().is_none());
    assert_eq!(f.sessions.count().await, 1);
}

#[tokio::test]
async fn test_disabled_cleanup_is_noop() {
    let f = fixture(CleanupConfig {
        enabled: false,
        ..Default::default()
    });
    f.challenges.put(challenge(Duration::days(30))).await;

    let result = f.cleanup.run_cleanup().await.unwrap();
    assert_eq!(result.total_cleaned(), 0);
    assert_eq!(f.challenges.all().await.len(), 1);
}
