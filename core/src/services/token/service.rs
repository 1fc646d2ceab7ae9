//! Main token service implementation

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::entities::session::{RevocationReason, Session};
use crate::domain::entities::surface::Surface;
use crate::domain::entities::token::{Claims, RefreshToken, REFRESH_TOKEN_BYTES};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::RefreshTokenRepository;
use crate::services::session::SessionService;

use super::config::TokenServiceConfig;

/// Hex SHA-256 of a raw refresh token; the only form that is ever stored
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Service for managing access tokens, refresh tokens and session revocation
pub struct TokenService {
    repository: Arc<dyn RefreshTokenRepository>,
    sessions: Arc<SessionService>,
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Refresh token persistence
    /// * `sessions` - Session store used for rotation and revocation
    /// * `config` - Secrets, issuer/audience and per-surface lifetimes
    pub fn new(
        repository: Arc<dyn RefreshTokenRepository>,
        sessions: Arc<SessionService>,
        config: TokenServiceConfig,
    ) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = config.leeway_seconds;

        Self {
            repository,
            sessions,
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Access token lifetime in seconds for a surface
    pub fn access_ttl(&self, surface: Surface) -> i64 {
        self.config.for_surface(surface).access_ttl_seconds
    }

    /// Mint a signed access token bound to a session
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The encoded JWT
    /// * `Err(TokenError::InvalidSessionIdentifier)` - `session_id` is nil
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        surface: Surface,
        session_id: Uuid,
    ) -> DomainResult<String> {
        if session_id.is_nil() {
            return Err(TokenError::InvalidSessionIdentifier.into());
        }

        let claims = Claims::new_access_token(
            user_id,
            surface,
            session_id,
            self.access_ttl(surface),
            &self.config.issuer,
            &self.config.audience,
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign access token: {}", e)))
    }

    /// Verify signature, issuer, audience, expiry and token type
    pub fn verify_access_token(&self, token: &str) -> DomainResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            TokenError::InvalidAccessToken
        })?;

        if !data.claims.is_access_token() {
            return Err(TokenError::InvalidAccessToken.into());
        }
        Ok(data.claims)
    }

    /// Create and store a refresh token. The raw value is returned exactly once.
    pub async fn generate_refresh_token(
        &self,
        user_id: Uuid,
        surface: Surface,
        session_id: Uuid,
        ip: Option<String>,
    ) -> DomainResult<String> {
        let (raw, record) = self.new_refresh_token(user_id, surface, session_id, ip);
        self.repository.create(&record).await?;
        Ok(raw)
    }

    /// Look up a presented refresh token by hash and check its liveness
    pub async fn verify_refresh_token(&self, raw: &str) -> DomainResult<RefreshToken> {
        if raw.is_empty() {
            return Err(TokenError::InvalidRefreshToken.into());
        }

        let record = self
            .repository
            .find_by_hash(&hash_token(raw))
            .await?
            .ok_or(TokenError::InvalidRefreshToken)?;

        if record.is_expired() {
            return Err(TokenError::RefreshTokenExpired.into());
        }
        if record.is_revoked() {
            tracing::warn!(
                session_id = %record.session_id,
                reason = ?record.revoked_reason,
                event = "refresh_token_reuse",
                "Revoked refresh token presented"
            );
            return Err(TokenError::RefreshTokenRevoked.into());
        }
        Ok(record)
    }

    /// Replace `old` with a successor under the same session
    ///
    /// The predecessor is revoked with reason `rotated` and points at the successor's
    /// hash. Of two concurrent rotations of the same token exactly one succeeds.
    pub async fn rotate_refresh_token(
        &self,
        old: &RefreshToken,
        ip: Option<String>,
        mut session: Session,
    ) -> DomainResult<(String, Session)> {
        if !session.is_active {
            return Err(TokenError::SessionInvalid.into());
        }
        self.sessions.touch(&mut session).await?;

        let (raw, successor) = self.new_refresh_token(old.user_id, old.surface, session.id, ip);
        if !self.repository.rotate(&old.token_hash, &successor).await? {
            return Err(TokenError::RefreshTokenRevoked.into());
        }

        tracing::info!(
            session_id = %session.id,
            surface = %old.surface,
            event = "refresh_token_rotated",
            "Refresh token rotated"
        );
        Ok((raw, session))
    }

    /// Revoke a session and every refresh token still attached to it
    pub async fn revoke_session(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
    ) -> DomainResult<u64> {
        self.sessions.revoke(session_id, reason).await?;
        let revoked = self
            .repository
            .revoke_by_session(session_id, reason, Utc::now())
            .await?;
        tracing::info!(
            session_id = %session_id,
            tokens_revoked = revoked,
            event = "session_tokens_revoked",
            "Revoked session refresh tokens"
        );
        Ok(revoked)
    }

    fn new_refresh_token(
        &self,
        user_id: Uuid,
        surface: Surface,
        session_id: Uuid,
        ip: Option<String>,
    ) -> (String, RefreshToken) {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let raw = hex::encode(bytes);

        let record = RefreshToken::new(
            user_id,
            session_id,
            surface,
            hash_token(&raw),
            self.config.for_surface(surface).refresh_ttl_seconds,
            ip,
        );
        (raw, record)
    }
}
