//! Request and response bodies for the auth routes. JSON is camelCase.
//!
//! Missing string fields default to empty so the core reports its own
//! `MISSING_PHONE` / `MISSING_CHALLENGE_ID` codes instead of a parse error.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use salon_core::{AuthResult, IssuedChallenge, Surface, UserProfile};

use crate::middleware::auth::AuthContext;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    /// E.164 phone; separators are tolerated
    #[serde(default)]
    #[validate(length(max = 32, message = "Phone number is too long"))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResendOtpRequest {
    #[serde(default)]
    #[validate(length(max = 64, message = "Challenge id is too long"))]
    pub challenge_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[serde(default)]
    #[validate(length(max = 64, message = "Challenge id is too long"))]
    pub challenge_id: String,

    /// The 6-digit code
    #[serde(default)]
    #[validate(length(max = 16, message = "Code is too long"))]
    pub otp: String,
}

/// Body of both `token/refresh` and `logout`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    #[validate(length(max = 512, message = "Refresh token is too long"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub challenge_id: Uuid,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

impl From<IssuedChallenge> for ChallengeResponse {
    fn from(issued: IssuedChallenge) -> Self {
        Self {
            challenge_id: issued.challenge_id,
            expires_in: issued.expires_in,
            dev_code: issued.dev_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: UserProfile,
    pub session_id: Uuid,
    pub surface: Surface,
}

impl From<AuthResult> for AuthResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            access_token: result.tokens.access_token,
            refresh_token: result.tokens.refresh_token,
            expires_in: result.tokens.expires_in,
            user: result.user,
            session_id: result.session_id,
            surface: result.surface,
        }
    }
}

/// Current identity returned by `GET .../auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: UserProfile,
    pub surface: Surface,
    pub session_id: Uuid,
}

impl From<&AuthContext> for MeResponse {
    fn from(auth: &AuthContext) -> Self {
        Self {
            user: auth.profile(),
            surface: auth.surface,
            session_id: auth.session_id,
        }
    }
}
