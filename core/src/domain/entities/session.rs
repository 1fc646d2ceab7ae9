//! Login session entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::surface::Surface;

/// Reason recorded when a session or refresh token is revoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevocationReason {
    /// User logged out
    Logout,
    /// Refresh token replaced by its successor
    Rotated,
    /// Owning session was revoked
    SessionRevoked,
    /// Session sat idle past its surface's refresh lifetime
    Expired,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::Logout => "logout",
            RevocationReason::Rotated => "rotated",
            RevocationReason::SessionRevoked => "session-revoked",
            RevocationReason::Expired => "expired",
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevocationReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logout" => Ok(RevocationReason::Logout),
            "rotated" => Ok(RevocationReason::Rotated),
            "session-revoked" => Ok(RevocationReason::SessionRevoked),
            "expired" => Ok(RevocationReason::Expired),
            other => Err(format!("Unknown revocation reason: {}", other)),
        }
    }
}

/// One authenticated login lifetime for a (user, surface) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub surface: Surface,
    pub is_active: bool,
    pub created_by_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_reason: Option<RevocationReason>,
}

impl Session {
    pub fn new(
        user_id: Uuid,
        surface: Surface,
        created_by_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            surface,
            is_active: true,
            created_by_ip,
            user_agent,
            created_at: now,
            last_used_at: now,
            revoked_at: None,
            revoked_reason: None,
        }
    }

    pub fn belongs_to(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// The single state transition a session supports
    pub fn revoke(&mut self, reason: RevocationReason) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        self.revoked_at = Some(Utc::now());
        self.revoked_reason = Some(reason);
        true
    }
}
