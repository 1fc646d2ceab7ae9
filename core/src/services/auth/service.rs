//! Main authentication service implementation

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::challenge::ChallengeMeta;
use crate::domain::entities::session::{RevocationReason, Session};
use crate::domain::entities::surface::Surface;
use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::{User, UserProfile};
use crate::errors::{AuthError, DomainResult, TokenError};
use crate::repositories::UserRepository;
use crate::services::challenge::{ChallengeService, IssuedChallenge};
use crate::services::policy::SurfacePolicy;
use crate::services::session::SessionService;
use crate::services::token::TokenService;

/// Tokens and sanitized user returned by verify and refresh
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub tokens: TokenPair,
    pub user: UserProfile,
    pub session_id: Uuid,
    pub surface: Surface,
}

/// Identity resolved from a bearer access token
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub user: User,
    pub surface: Surface,
    pub session_id: Uuid,
}

/// Authentication service composing challenges, policy, sessions and tokens
pub struct AuthService {
    challenges: Arc<ChallengeService>,
    tokens: Arc<TokenService>,
    sessions: Arc<SessionService>,
    policy: Arc<SurfacePolicy>,
    users: Arc<dyn UserRepository>,
}

impl AuthService {
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `challenges` - OTP challenge store
    /// * `tokens` - Access/refresh token service
    /// * `sessions` - Session store
    /// * `policy` - Per-surface admission rules
    /// * `users` - User lookups for refresh and request authentication
    pub fn new(
        challenges: Arc<ChallengeService>,
        tokens: Arc<TokenService>,
        sessions: Arc<SessionService>,
        policy: Arc<SurfacePolicy>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            challenges,
            tokens,
            sessions,
            policy,
            users,
        }
    }

    pub fn policy(&self) -> &SurfacePolicy {
        &self.policy
    }

    /// Start an OTP login
    ///
    /// On the admin surface the allow-list is checked before any challenge exists,
    /// so disallowed numbers never receive a code.
    pub async fn initiate_otp(
        &self,
        raw_phone: &str,
        surface: Surface,
        meta: ChallengeMeta,
    ) -> DomainResult<IssuedChallenge> {
        if surface == Surface::Admin {
            let phone = ChallengeService::normalize_phone(raw_phone)?;
            self.policy.ensure_admin_allowed(&phone)?;
        }
        self.challenges.create_challenge(raw_phone, surface, meta).await
    }

    pub async fn resend_otp(
        &self,
        challenge_id: &str,
        surface: Surface,
    ) -> DomainResult<IssuedChallenge> {
        let challenge_id = parse_challenge_id(challenge_id)?;
        self.challenges.resend_challenge(challenge_id, surface).await
    }

    /// Verify a code, admit the user for the surface and open a session
    pub async fn verify_otp(
        &self,
        challenge_id: &str,
        code: &str,
        surface: Surface,
        meta: ChallengeMeta,
    ) -> DomainResult<AuthResult> {
        let challenge_id = parse_challenge_id(challenge_id)?;
        let verified = self.challenges.verify_challenge(challenge_id, code).await?;

        if verified.surface != surface {
            tracing::warn!(
                challenge_id = %challenge_id,
                challenge_surface = %verified.surface,
                requested_surface = %surface,
                event = "surface_mismatch",
                "Challenge verified on the wrong surface"
            );
            return Err(AuthError::SurfaceMismatch.into());
        }

        let user = self.policy.admit(surface, &verified.phone).await?;
        let session = self
            .sessions
            .create(user.id, surface, meta.ip.clone(), meta.user_agent)
            .await?;

        let access_token = self.tokens.generate_access_token(user.id, surface, session.id)?;
        let refresh_token = self
            .tokens
            .generate_refresh_token(user.id, surface, session.id, meta.ip)
            .await?;

        tracing::info!(
            user_id = %user.id,
            session_id = %session.id,
            surface = %surface,
            event = "login_succeeded",
            "User logged in"
        );

        Ok(self.result(&user, &session, access_token, refresh_token))
    }

    /// Rotate a refresh token and mint a new access token under the same session
    pub async fn refresh_tokens(
        &self,
        refresh_token: &str,
        surface: Surface,
        ip: Option<String>,
    ) -> DomainResult<AuthResult> {
        let record = self.tokens.verify_refresh_token(refresh_token).await?;
        if record.surface != surface {
            return Err(AuthError::SurfaceScopeMismatch.into());
        }

        let user = self
            .users
            .find_by_id(record.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let session = self
            .sessions
            .find(record.session_id)
            .await?
            .filter(|s| s.is_active && s.belongs_to(user.id))
            .ok_or(TokenError::SessionInvalid)?;

        let (new_refresh, session) = self.tokens.rotate_refresh_token(&record, ip, session).await?;
        let access_token = self.tokens.generate_access_token(user.id, surface, session.id)?;

        Ok(self.result(&user, &session, access_token, new_refresh))
    }

    /// Revoke the session owning `refresh_token`, and with it every token in the chain
    pub async fn logout(&self, refresh_token: &str, surface: Surface) -> DomainResult<()> {
        let record = self.tokens.verify_refresh_token(refresh_token).await?;
        if record.surface != surface {
            return Err(AuthError::SurfaceScopeMismatch.into());
        }

        self.tokens
            .revoke_session(record.session_id, RevocationReason::Logout)
            .await?;

        tracing::info!(
            user_id = %record.user_id,
            session_id = %record.session_id,
            surface = %surface,
            event = "logout",
            "User logged out"
        );
        Ok(())
    }

    /// Resolve a bearer access token to a live session and its user
    pub async fn authenticate(&self, access_token: &str) -> DomainResult<AuthenticatedIdentity> {
        let claims = self.tokens.verify_access_token(access_token)?;

        let session_id = claims.session_id().map_err(|_| TokenError::SessionNotFound)?;
        let user_id = claims.user_id().map_err(|_| TokenError::InvalidAccessToken)?;

        let session = self.sessions.require_active_for(session_id, user_id).await?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(AuthenticatedIdentity {
            user,
            surface: claims.surface,
            session_id: session.id,
        })
    }

    fn result(
        &self,
        user: &User,
        session: &Session,
        access_token: String,
        refresh_token: String,
    ) -> AuthResult {
        AuthResult {
            tokens: TokenPair {
                access_token,
                refresh_token,
                expires_in: self.tokens.access_ttl(session.surface),
            },
            user: user.profile(),
            session_id: session.id,
            surface: session.surface,
        }
    }
}

/// Empty ids are a validation error; anything unparsable cannot name a challenge
fn parse_challenge_id(raw: &str) -> DomainResult<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AuthError::MissingChallengeId.into());
    }
    Uuid::parse_str(raw).map_err(|_| AuthError::ChallengeNotFound.into())
}
