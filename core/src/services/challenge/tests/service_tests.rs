//! Unit tests for the challenge service

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::challenge::{ChallengeMeta, ChallengeStatus, LockReason};
use crate::domain::entities::surface::Surface;
use crate::errors::{AuthError, DomainError};
use crate::repositories::{ChallengeRepository, InMemoryChallengeRepository};
use crate::services::challenge::{ChallengeService, ChallengeServiceConfig};
use crate::services::sms::RecordingSmsSender;

const PHONE: &str = "+15550001234";

struct Fixture {
    service: ChallengeService,
    repo: Arc<InMemoryChallengeRepository>,
    sms: Arc<RecordingSmsSender>,
}

fn fixture_with(config: ChallengeServiceConfig) -> Fixture {
    let repo = Arc::new(InMemoryChallengeRepository::new());
    let sms = Arc::new(RecordingSmsSender::new());
    let service = ChallengeService::new(repo.clone(), sms.clone(), config);
    Fixture { service, repo, sms }
}

fn fixture() -> Fixture {
    fixture_with(ChallengeServiceConfig {
        bcrypt_cost: 4,
        max_attempts: 3,
        max_resends: 2,
        ..Default::default()
    })
}

fn meta() -> ChallengeMeta {
    ChallengeMeta::new(Some("203.0.113.7".to_string()), Some("test-agent".to_string()))
}

fn assert_auth_error(result: Result<impl std::fmt::Debug, DomainError>, expected: AuthError) {
    match result {
        Err(DomainError::Auth(e)) => assert_eq!(e, expected),
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}

#[tokio::test]
async fn test_create_challenge_stores_hash_and_sends_code() {
    let f = fixture();
    let issued = f
        .service
        .create_challenge(" +1 555 000 1234 ", Surface::SalonOwner, meta())
        .await
        .unwrap();

    assert_eq!(issued.expires_in, 300);
    assert!(issued.dev_code.is_none());

    let code = f.sms.last_code_for(PHONE).unwrap();
    let stored = f.repo.find_by_id(issued.challenge_id).await.unwrap().unwrap();
    assert_eq!(stored.phone, PHONE);
    assert_eq!(stored.attempts, 0);
    assert_eq!(stored.max_attempts, 3);
    assert_eq!(stored.resend_count, 0);
    assert_eq!(stored.meta, meta());
    assert_ne!(stored.otp_hash, code);
    assert!(bcrypt::verify(&code, &stored.otp_hash).unwrap());
}

#[tokio::test]
async fn test_create_challenge_rejects_bad_phones() {
    let f = fixture();
    assert_auth_error(
        f.service.create_challenge("", Surface::SalonOwner, meta()).await,
        AuthError::MissingPhone,
    );
    assert_auth_error(
        f.service.create_challenge("5550001234", Surface::SalonOwner, meta()).await,
        AuthError::InvalidPhoneFormat,
    );
    assert!(f.repo.all().await.is_empty());
    assert_eq!(f.sms.sent_count(), 0);
}

#[tokio::test]
async fn test_new_challenge_supersedes_previous_for_same_pair() {
    let f = fixture();
    let first = f.service.create_challenge(PHONE, Surface::SalonOwner, meta()).await.unwrap();
    let first_code = f.sms.last_code_for(PHONE).unwrap();
    let second = f.service.create_challenge(PHONE, Surface::SalonOwner, meta()).await.unwrap();

    let old = f.repo.find_by_id(first.challenge_id).await.unwrap().unwrap();
    assert_eq!(old.status, ChallengeStatus::Locked);
    assert_eq!(old.lock_reason, Some(LockReason::Superseded));

    assert_auth_error(
        f.service.verify_challenge(first.challenge_id, &first_code).await,
        AuthError::ChallengeNotFound,
    );

    let active: Vec<_> = f.repo.all().await.into_iter().filter(|c| c.is_active()).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second.challenge_id);
}

#[tokio::test]
async fn test_verify_succeeds_at_most_once() {
    let f = fixture();
    let issued = f.service.create_challenge(PHONE, Surface::SalonEmployee, meta()).await.unwrap();
    let code = f.sms.last_code_for(PHONE).unwrap();

    let verified = f.service.verify_challenge(issued.challenge_id, &code).await.unwrap();
    assert_eq!(verified.phone, PHONE);
    assert_eq!(verified.surface, Surface::SalonEmployee);

    assert_auth_error(
        f.service.verify_challenge(issued.challenge_id, &code).await,
        AuthError::ChallengeNotFound,
    );
    let stored = f.repo.find_by_id(issued.challenge_id).await.unwrap().unwrap();
    assert_eq!(stored.status, ChallengeStatus::Used);
}

#[tokio::test]
async fn test_wrong_codes_increment_attempts_then_lock() {
    let f = fixture();
    let issued = f.service.create_challenge(PHONE, Surface::SalonOwner, meta()).await.unwrap();
    let code = f.sms.last_code_for(PHONE).unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    assert_auth_error(
        f.service.verify_challenge(issued.challenge_id, wrong).await,
        AuthError::InvalidOtp { remaining_attempts: 2 },
    );
    // Malformed codes count as wrong attempts
    assert_auth_error(
        f.service.verify_challenge(issued.challenge_id, "12ab").await,
        AuthError::InvalidOtp { remaining_attempts: 1 },
    );
    assert_auth_error(
        f.service.verify_challenge(issued.challenge_id, wrong).await,
        AuthError::InvalidOtp { remaining_attempts: 0 },
    );

    let stored = f.repo.find_by_id(issued.challenge_id).await.unwrap().unwrap();
    assert_eq!(stored.attempts, 3);
    assert_eq!(stored.lock_reason, Some(LockReason::MaxAttempts));

    // The correct code no longer works
    assert_auth_error(
        f.service.verify_challenge(issued.challenge_id, &code).await,
        AuthError::ChallengeNotFound,
    );
}

#[tokio::test]
async fn test_exhausted_but_active_challenge_fails_attempts_exceeded() {
    let f = fixture();
    let issued = f.service.create_challenge(PHONE, Surface::SalonOwner, meta()).await.unwrap();
    let code = f.sms.last_code_for(PHONE).unwrap();

    let mut stored = f.repo.find_by_id(issued.challenge_id).await.unwrap().unwrap();
    stored.attempts = stored.max_attempts;
    f.repo.put(stored).await;

    assert_auth_error(
        f.service.verify_challenge(issued.challenge_id, &code).await,
        AuthError::AttemptsExceeded,
    );
    let stored = f.repo.find_by_id(issued.challenge_id).await.unwrap().unwrap();
    assert_eq!(stored.lock_reason, Some(LockReason::MaxAttempts));
}

#[tokio::test]
async fn test_expired_challenge_locks() {
    let f = fixture();
    let issued = f.service.create_challenge(PHONE, Surface::SalonOwner, meta()).await.unwrap();
    let code = f.sms.last_code_for(PHONE).unwrap();

    let mut stored = f.repo.find_by_id(issued.challenge_id).await.unwrap().unwrap();
    stored.expires_at = Utc::now() - Duration::seconds(1);
    f.repo.put(stored).await;

    assert_auth_error(
        f.service.verify_challenge(issued.challenge_id, &code).await,
        AuthError::ChallengeExpired,
    );
    let stored = f.repo.find_by_id(issued.challenge_id).await.unwrap().unwrap();
    assert_eq!(stored.lock_reason, Some(LockReason::Expired));
}

#[tokio::test]
async fn test_unknown_challenge() {
    let f = fixture();
    assert_auth_error(
        f.service.verify_challenge(Uuid::new_v4(), "123456").await,
        AuthError::ChallengeNotFound,
    );
}

#[tokio::test]
async fn test_resend_rotates_and_invalidates_old_id() {
    let f = fixture();
    let first = f.service.create_challenge(PHONE, Surface::SalonOwner, meta()).await.unwrap();
    let first_code = f.sms.last_code_for(PHONE).unwrap();

    let second = f.service.resend_challenge(first.challenge_id, Surface::SalonOwner).await.unwrap();
    assert_ne!(second.challenge_id, first.challenge_id);
    assert_eq!(f.sms.sent_count(), 2);

    let old = f.repo.find_by_id(first.challenge_id).await.unwrap().unwrap();
    assert_eq!(old.lock_reason, Some(LockReason::Rotated));
    let fresh = f.repo.find_by_id(second.challenge_id).await.unwrap().unwrap();
    assert_eq!(fresh.resend_count, 1);
    assert_eq!(fresh.phone, PHONE);
    assert_eq!(fresh.meta, meta());

    assert_auth_error(
        f.service.verify_challenge(first.challenge_id, &first_code).await,
        AuthError::ChallengeNotFound,
    );
    let second_code = f.sms.last_code_for(PHONE).unwrap();
    assert!(f.service.verify_challenge(second.challenge_id, &second_code).await.is_ok());
}

#[tokio::test]
async fn test_resend_limit_locks_chain() {
    let f = fixture();
    let mut current = f.service.create_challenge(PHONE, Surface::SalonOwner, meta()).await.unwrap();
    for _ in 0..2 {
        current = f.service.resend_challenge(current.challenge_id, Surface::SalonOwner).await.unwrap();
    }

    assert_auth_error(
        f.service.resend_challenge(current.challenge_id, Surface::SalonOwner).await,
        AuthError::ResendLimitExceeded,
    );
    let stored = f.repo.find_by_id(current.challenge_id).await.unwrap().unwrap();
    assert_eq!(stored.lock_reason, Some(LockReason::ResendLimit));
}

#[tokio::test]
async fn test_resend_requires_matching_surface_and_active_challenge() {
    let f = fixture();
    let issued = f.service.create_challenge(PHONE, Surface::SalonOwner, meta()).await.unwrap();

    assert_auth_error(
        f.service.resend_challenge(issued.challenge_id, Surface::Admin).await,
        AuthError::SurfaceMismatch,
    );

    let code = f.sms.last_code_for(PHONE).unwrap();
    f.service.verify_challenge(issued.challenge_id, &code).await.unwrap();
    assert_auth_error(
        f.service.resend_challenge(issued.challenge_id, Surface::SalonOwner).await,
        AuthError::ChallengeNotFound,
    );
}

#[tokio::test]
async fn test_sms_failure_does_not_roll_back_challenge() {
    let f = fixture();
    f.sms.set_failing(true);
    let issued = f.service.create_challenge(PHONE, Surface::SalonOwner, meta()).await.unwrap();
    let stored = f.repo.find_by_id(issued.challenge_id).await.unwrap().unwrap();
    assert!(stored.is_active());
}

#[tokio::test]
async fn test_test_mode_code() {
    let f = fixture_with(ChallengeServiceConfig {
        bcrypt_cost: 4,
        test_code: Some("424242".to_string()),
        ..Default::default()
    });
    let issued = f.service.create_challenge(PHONE, Surface::SalonOwner, meta()).await.unwrap();
    assert_eq!(issued.dev_code.as_deref(), Some("424242"));
    assert!(f.service.verify_challenge(issued.challenge_id, "424242").await.is_ok());
}

#[test]
fn test_config_drops_test_code_in_production() {
    use salon_shared::config::{Environment, OtpConfig};

    let otp = OtpConfig {
        test_code: Some("424242".to_string()),
        bcrypt_cost: 4,
        ..Default::default()
    };
    let prod = ChallengeServiceConfig::from_otp_config(&otp, Environment::Production);
    assert!(prod.test_code.is_none());
    assert_eq!(prod.bcrypt_cost, 10);

    let dev = ChallengeServiceConfig::from_otp_config(&otp, Environment::Development);
    assert_eq!(dev.test_code.as_deref(), Some("424242"));

    let malformed = OtpConfig {
        test_code: Some("42".to_string()),
        ..Default::default()
    };
    assert!(ChallengeServiceConfig::from_otp_config(&malformed, Environment::Development)
        .test_code
        .is_none());
}
