use chrono::{Duration, Utc};

use crate::domain::entities::challenge::*;
use crate::domain::entities::surface::Surface;

fn challenge(max_attempts: i32) -> OtpChallenge {
    OtpChallenge::new(
        "+15550001234".to_string(),
        Surface::SalonOwner,
        "hash".to_string(),
        300,
        max_attempts,
        0,
        ChallengeMeta::default(),
    )
}

#[test]
fn test_new_challenge_is_active() {
    let c = challenge(5);
    assert!(c.is_active());
    assert_eq!(c.attempts, 0);
    assert_eq!(c.resend_count, 0);
    assert!(c.lock_reason.is_none());
    assert!(!c.is_expired());
    assert!(c.expires_in() > 290 && c.expires_in() <= 300);
}

#[test]
fn test_expiry() {
    let c = challenge(5);
    assert!(c.is_expired_at(c.expires_at + Duration::seconds(1)));
    assert!(!c.is_expired_at(Utc::now()));
}

#[test]
fn test_failed_attempts_lock_at_max() {
    let mut c = challenge(2);
    assert!(c.record_failed_attempt());
    assert!(c.is_active());
    assert_eq!(c.remaining_attempts(), 1);

    assert!(c.record_failed_attempt());
    assert_eq!(c.status, ChallengeStatus::Locked);
    assert_eq!(c.lock_reason, Some(LockReason::MaxAttempts));
    assert_eq!(c.remaining_attempts(), 0);

    // Terminal
    assert!(!c.record_failed_attempt());
    assert_eq!(c.attempts, 2);
}

#[test]
fn test_terminal_states_do_not_transition() {
    let mut c = challenge(5);
    assert!(c.mark_used());
    assert!(!c.mark_used());
    assert!(!c.lock(LockReason::Superseded));
    assert_eq!(c.status, ChallengeStatus::Used);

    let mut c = challenge(5);
    assert!(c.lock(LockReason::Rotated));
    assert!(!c.mark_used());
    assert_eq!(c.lock_reason, Some(LockReason::Rotated));
}

#[test]
fn test_generate_otp_code_shape() {
    for _ in 0..100 {
        let code = generate_otp_code();
        assert_eq!(code.len(), OTP_CODE_LENGTH);
        assert!(is_well_formed_code(&code));
    }
}

#[test]
fn test_is_well_formed_code() {
    assert!(is_well_formed_code("000000"));
    assert!(!is_well_formed_code("12345"));
    assert!(!is_well_formed_code("1234567"));
    assert!(!is_well_formed_code("12a456"));
    assert!(!is_well_formed_code("１２３４５６"));
}

#[test]
fn test_lock_reason_round_trip_strings() {
    for reason in [
        LockReason::Expired,
        LockReason::MaxAttempts,
        LockReason::ResendLimit,
        LockReason::Superseded,
        LockReason::Rotated,
    ] {
        assert_eq!(reason.as_str().parse::<LockReason>(), Ok(reason));
    }
}
