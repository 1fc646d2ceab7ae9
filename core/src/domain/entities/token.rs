//! Token entities for session-bound JWT authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::RevocationReason;
use super::surface::Surface;

/// Value of the `typ` claim on access tokens
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Random bytes in an opaque refresh token
pub const REFRESH_TOKEN_BYTES: usize = 48;

/// Claims structure for the access token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Session ID the token is bound to
    pub sid: String,

    /// Surface the token was issued for
    pub surface: Surface,

    /// Token type discriminator
    pub typ: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Creates new claims for an access token
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user's UUID
    /// * `surface` - Surface the login happened on
    /// * `session_id` - Owning session
    /// * `ttl_seconds` - Token lifetime
    /// * `issuer` / `audience` - Values for `iss` and `aud`
    pub fn new_access_token(
        user_id: Uuid,
        surface: Surface,
        session_id: Uuid,
        ttl_seconds: i64,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::seconds(ttl_seconds);

        Self {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            surface,
            typ: ACCESS_TOKEN_TYPE.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            nbf: now.timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn is_access_token(&self) -> bool {
        self.typ == ACCESS_TOKEN_TYPE
    }

    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Gets the session ID from the claims
    pub fn session_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sid)
    }
}

/// Refresh token record. Only the SHA-256 hash of the raw token is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub surface: Surface,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_reason: Option<RevocationReason>,
    /// Hash of the token that replaced this one on rotation
    pub replaced_by_token_hash: Option<String>,
    pub created_by_ip: Option<String>,
}

impl RefreshToken {
    pub fn new(
        user_id: Uuid,
        session_id: Uuid,
        surface: Surface,
        token_hash: String,
        ttl_seconds: i64,
        created_by_ip: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            session_id,
            surface,
            token_hash,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_seconds),
            revoked_at: None,
            revoked_reason: None,
            replaced_by_token_hash: None,
            created_by_ip,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Unrevoked and unexpired
    pub fn is_live(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }

    pub fn revoke(&mut self, reason: RevocationReason, replaced_by: Option<String>) -> bool {
        if self.is_revoked() {
            return false;
        }
        self.revoked_at = Some(Utc::now());
        self.revoked_reason = Some(reason);
        self.replaced_by_token_hash = replaced_by;
        true
    }
}

/// Token pair handed to the client after verify or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}
