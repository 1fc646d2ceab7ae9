//! OTP challenge entity for phone-based sign-in.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::surface::Surface;

/// Length of the one-time code
pub const OTP_CODE_LENGTH: usize = 6;

/// Challenge lifecycle state. `Used` and `Locked` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeStatus {
    Active,
    Used,
    Locked,
}

impl ChallengeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeStatus::Active => "ACTIVE",
            ChallengeStatus::Used => "USED",
            ChallengeStatus::Locked => "LOCKED",
        }
    }
}

impl FromStr for ChallengeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(ChallengeStatus::Active),
            "USED" => Ok(ChallengeStatus::Used),
            "LOCKED" => Ok(ChallengeStatus::Locked),
            other => Err(format!("Unknown challenge status: {}", other)),
        }
    }
}

/// Why a challenge left the `Active` state without being used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LockReason {
    Expired,
    MaxAttempts,
    ResendLimit,
    Superseded,
    Rotated,
}

impl LockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockReason::Expired => "expired",
            LockReason::MaxAttempts => "max-attempts",
            LockReason::ResendLimit => "resend-limit",
            LockReason::Superseded => "superseded",
            LockReason::Rotated => "rotated",
        }
    }
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expired" => Ok(LockReason::Expired),
            "max-attempts" => Ok(LockReason::MaxAttempts),
            "resend-limit" => Ok(LockReason::ResendLimit),
            "superseded" => Ok(LockReason::Superseded),
            "rotated" => Ok(LockReason::Rotated),
            other => Err(format!("Unknown lock reason: {}", other)),
        }
    }
}

/// Request metadata captured when a challenge is issued
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ChallengeMeta {
    pub fn new(ip: Option<String>, user_agent: Option<String>) -> Self {
        Self { ip, user_agent }
    }
}

/// A single OTP issuance bound to one phone and surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpChallenge {
    /// Opaque challenge identifier handed to the client
    pub id: Uuid,

    /// Normalized E.164 phone
    pub phone: String,

    pub surface: Surface,

    /// bcrypt hash of the code; the code itself is never stored
    pub otp_hash: String,

    pub expires_at: DateTime<Utc>,

    /// Wrong codes submitted so far
    pub attempts: i32,

    pub max_attempts: i32,

    pub status: ChallengeStatus,

    /// Number of resends that led to this challenge
    pub resend_count: i32,

    pub lock_reason: Option<LockReason>,

    pub meta: ChallengeMeta,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Creates a fresh `Active` challenge
    pub fn new(
        phone: String,
        surface: Surface,
        otp_hash: String,
        ttl_seconds: i64,
        max_attempts: i32,
        resend_count: i32,
        meta: ChallengeMeta,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            phone,
            surface,
            otp_hash,
            expires_at: now + Duration::seconds(ttl_seconds),
            attempts: 0,
            max_attempts,
            status: ChallengeStatus::Active,
            resend_count,
            lock_reason: None,
            meta,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ChallengeStatus::Active
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn attempts_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub fn remaining_attempts(&self) -> i32 {
        (self.max_attempts - self.attempts).max(0)
    }

    /// Seconds until expiry, never negative
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }

    /// Transition `Active -> Locked`. No-op on terminal challenges.
    pub fn lock(&mut self, reason: LockReason) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = ChallengeStatus::Locked;
        self.lock_reason = Some(reason);
        self.updated_at = Utc::now();
        true
    }

    /// Transition `Active -> Used`. No-op on terminal challenges.
    pub fn mark_used(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = ChallengeStatus::Used;
        self.updated_at = Utc::now();
        true
    }

    /// Count a wrong code, locking once the limit is reached
    pub fn record_failed_attempt(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.attempts += 1;
        self.updated_at = Utc::now();
        if self.attempts_exhausted() {
            self.status = ChallengeStatus::Locked;
            self.lock_reason = Some(LockReason::MaxAttempts);
        }
        true
    }
}

/// Generates a cryptographically secure random 6-digit code
pub fn generate_otp_code() -> String {
    let code: u32 = OsRng.gen_range(0..1_000_000);
    format!("{:06}", code)
}

/// Whether `code` has the shape of an OTP (exactly six ASCII digits)
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == OTP_CODE_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}
