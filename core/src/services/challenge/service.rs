//! Challenge service implementation

use std::sync::Arc;

use chrono::Utc;
use salon_shared::utils::phone::{mask_phone, normalize_e164, PhoneError};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::challenge::{
    generate_otp_code, is_well_formed_code, ChallengeMeta, LockReason, OtpChallenge,
};
use crate::domain::entities::surface::Surface;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::ChallengeRepository;
use crate::services::sms::SmsSender;

use super::config::ChallengeServiceConfig;
use super::hasher::OtpHasher;

/// Result of issuing or rotating a challenge
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedChallenge {
    pub challenge_id: Uuid,
    /// Seconds until the code expires
    pub expires_in: i64,
    /// The fixed test-mode code, present only outside production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

/// Identity proven by a successful verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedChallenge {
    pub phone: String,
    pub surface: Surface,
}

/// Service for the OTP challenge lifecycle
pub struct ChallengeService {
    repository: Arc<dyn ChallengeRepository>,
    sms_sender: Arc<dyn SmsSender>,
    hasher: OtpHasher,
    config: ChallengeServiceConfig,
}

impl ChallengeService {
    pub fn new(
        repository: Arc<dyn ChallengeRepository>,
        sms_sender: Arc<dyn SmsSender>,
        config: ChallengeServiceConfig,
    ) -> Self {
        Self {
            repository,
            sms_sender,
            hasher: OtpHasher::new(config.bcrypt_cost),
            config,
        }
    }

    /// Validate and normalize a raw phone to E.164
    pub fn normalize_phone(raw: &str) -> DomainResult<String> {
        normalize_e164(raw).map_err(|e| match e {
            PhoneError::Empty => DomainError::Auth(AuthError::MissingPhone),
            PhoneError::InvalidFormat => DomainError::Auth(AuthError::InvalidPhoneFormat),
        })
    }

    /// Issue a new challenge for (phone, surface), superseding any active one
    ///
    /// This method:
    /// 1. Normalizes the phone
    /// 2. Generates a code (or uses the test-mode code) and hashes it
    /// 3. Atomically supersedes active challenges for the pair and stores the new one
    /// 4. Dispatches the code by SMS; a dispatch failure is logged, not returned
    pub async fn create_challenge(
        &self,
        raw_phone: &str,
        surface: Surface,
        meta: ChallengeMeta,
    ) -> DomainResult<IssuedChallenge> {
        let phone = Self::normalize_phone(raw_phone)?;
        let (code, otp_hash) = self.new_code().await?;

        let challenge = OtpChallenge::new(
            phone,
            surface,
            otp_hash,
            self.config.ttl_seconds,
            self.config.max_attempts,
            0,
            meta,
        );

        let superseded = self.repository.replace_active(&challenge).await?;

        tracing::info!(
            phone = %mask_phone(&challenge.phone),
            surface = %surface,
            challenge_id = %challenge.id,
            superseded = superseded,
            event = "otp_generated",
            "Issued OTP challenge"
        );

        self.dispatch(&challenge, &code).await;
        Ok(self.issued(&challenge))
    }

    /// Verify `code` against an active challenge
    ///
    /// On success the challenge becomes `USED` and can never be verified again.
    pub async fn verify_challenge(
        &self,
        challenge_id: Uuid,
        code: &str,
    ) -> DomainResult<VerifiedChallenge> {
        let challenge = self
            .repository
            .find_by_id(challenge_id)
            .await?
            .filter(OtpChallenge::is_active)
            .ok_or(AuthError::ChallengeNotFound)?;

        if challenge.is_expired_at(Utc::now()) {
            self.repository.lock(challenge.id, LockReason::Expired).await?;
            tracing::info!(challenge_id = %challenge.id, event = "otp_expired", "OTP challenge expired");
            return Err(AuthError::ChallengeExpired.into());
        }

        if challenge.attempts_exhausted() {
            self.repository.lock(challenge.id, LockReason::MaxAttempts).await?;
            return Err(AuthError::AttemptsExceeded.into());
        }

        let matched =
            is_well_formed_code(code) && self.hasher.verify(code, &challenge.otp_hash).await?;

        if !matched {
            let updated = self
                .repository
                .record_failed_attempt(challenge.id)
                .await?
                .ok_or(AuthError::ChallengeNotFound)?;

            tracing::warn!(
                challenge_id = %challenge.id,
                attempts = updated.attempts,
                locked = !updated.is_active(),
                event = "otp_mismatch",
                "Wrong OTP submitted"
            );
            return Err(AuthError::InvalidOtp {
                remaining_attempts: updated.remaining_attempts(),
            }
            .into());
        }

        // Conditional on ACTIVE: the loser of a concurrent race sees false
        if !self.repository.mark_used(challenge.id).await? {
            return Err(AuthError::ChallengeNotFound.into());
        }

        tracing::info!(
            phone = %mask_phone(&challenge.phone),
            surface = %challenge.surface,
            challenge_id = %challenge.id,
            event = "otp_verified",
            "OTP challenge verified"
        );

        Ok(VerifiedChallenge {
            phone: challenge.phone,
            surface: challenge.surface,
        })
    }

    /// Replace an active challenge with a fresh one and send a new code
    pub async fn resend_challenge(
        &self,
        challenge_id: Uuid,
        surface: Surface,
    ) -> DomainResult<IssuedChallenge> {
        let challenge = self
            .repository
            .find_by_id(challenge_id)
            .await?
            .filter(OtpChallenge::is_active)
            .ok_or(AuthError::ChallengeNotFound)?;

        if challenge.surface != surface {
            return Err(AuthError::SurfaceMismatch.into());
        }

        if challenge.resend_count >= self.config.max_resends {
            self.repository.lock(challenge.id, LockReason::ResendLimit).await?;
            tracing::warn!(
                phone = %mask_phone(&challenge.phone),
                challenge_id = %challenge.id,
                event = "otp_resend_limit",
                "OTP resend limit reached"
            );
            return Err(AuthError::ResendLimitExceeded.into());
        }

        let (code, otp_hash) = self.new_code().await?;
        let replacement = OtpChallenge::new(
            challenge.phone.clone(),
            challenge.surface,
            otp_hash,
            self.config.ttl_seconds,
            self.config.max_attempts,
            challenge.resend_count + 1,
            challenge.meta.clone(),
        );

        if !self.repository.rotate(challenge.id, &replacement).await? {
            return Err(AuthError::ChallengeNotFound.into());
        }

        tracing::info!(
            phone = %mask_phone(&replacement.phone),
            surface = %surface,
            challenge_id = %replacement.id,
            previous_challenge_id = %challenge.id,
            resend_count = replacement.resend_count,
            event = "otp_resent",
            "Rotated OTP challenge"
        );

        self.dispatch(&replacement, &code).await;
        Ok(self.issued(&replacement))
    }

    async fn new_code(&self) -> DomainResult<(String, String)> {
        let code = match &self.config.test_code {
            Some(code) => code.clone(),
            None => generate_otp_code(),
        };
        let hash = self.hasher.hash(&code).await?;
        Ok((code, hash))
    }

    async fn dispatch(&self, challenge: &OtpChallenge, code: &str) {
        if let Err(e) = self.sms_sender.send_otp(&challenge.phone, code).await {
            tracing::error!(
                phone = %mask_phone(&challenge.phone),
                challenge_id = %challenge.id,
                error = %e,
                event = "otp_dispatch_failed",
                "Failed to send OTP; challenge remains active"
            );
        }
    }

    // Challenges are always fresh here, so the full TTL remains
    fn issued(&self, challenge: &OtpChallenge) -> IssuedChallenge {
        IssuedChallenge {
            challenge_id: challenge.id,
            expires_in: self.config.ttl_seconds,
            dev_code: self.config.test_code.clone(),
        }
    }
}
