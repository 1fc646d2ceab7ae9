//! Error types for the authentication core
//!
//! Every variant carries a stable machine-readable code and a category that the
//! presentation layer maps to an HTTP status.

use thiserror::Error;

/// Coarse classification used to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input (400)
    Validation,
    /// OTP challenge lifecycle failure (400)
    Challenge,
    /// Token or session failure (401)
    Authentication,
    /// Surface, role or tenant restriction (403)
    Authorization,
    /// Missing account (404)
    NotFound,
    /// Unexpected lower-level failure (500)
    Internal,
}

/// Authentication, challenge and authorization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    // Validation
    #[error("Invalid phone format")]
    InvalidPhoneFormat,

    #[error("Phone number is required")]
    MissingPhone,

    #[error("Challenge id is required")]
    MissingChallengeId,

    // Challenge lifecycle
    #[error("Challenge not found")]
    ChallengeNotFound,

    #[error("Verification code expired")]
    ChallengeExpired,

    #[error("Maximum attempts exceeded")]
    AttemptsExceeded,

    #[error("Invalid verification code")]
    InvalidOtp { remaining_attempts: i32 },

    #[error("Resend limit exceeded")]
    ResendLimitExceeded,

    // Surface / authorization
    #[error("Challenge was issued for a different surface")]
    SurfaceMismatch,

    #[error("Token was issued for a different surface")]
    SurfaceScopeMismatch,

    #[error("Phone number is not allowed on this surface")]
    PhoneNotAllowlisted,

    #[error("Account is not authorized for this surface")]
    AccountNotAuthorizedForSurface,

    #[error("Employee account is inactive")]
    EmployeeInactive,

    #[error("Employee is not assigned to a salon")]
    EmployeeUnassigned,

    #[error("Insufficient role")]
    InsufficientRole,

    #[error("Surface not permitted for this resource")]
    SurfaceNotPermitted,

    #[error("Tenant context required")]
    TenantRequired,

    #[error("Branch access denied")]
    BranchAccessDenied,

    // Not found
    #[error("Account not found")]
    AccountNotFound,

    #[error("Employee not found")]
    EmployeeNotFound,

    #[error("User not found")]
    UserNotFound,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidPhoneFormat => "INVALID_PHONE_FORMAT",
            AuthError::MissingPhone => "MISSING_PHONE",
            AuthError::MissingChallengeId => "MISSING_CHALLENGE_ID",
            AuthError::ChallengeNotFound => "CHALLENGE_NOT_FOUND",
            AuthError::ChallengeExpired => "CHALLENGE_EXPIRED",
            AuthError::AttemptsExceeded => "ATTEMPTS_EXCEEDED",
            AuthError::InvalidOtp { .. } => "INVALID_OTP",
            AuthError::ResendLimitExceeded => "RESEND_LIMIT_EXCEEDED",
            AuthError::SurfaceMismatch => "SURFACE_MISMATCH",
            AuthError::SurfaceScopeMismatch => "SURFACE_SCOPE_MISMATCH",
            AuthError::PhoneNotAllowlisted => "PHONE_NOT_ALLOWLISTED",
            AuthError::AccountNotAuthorizedForSurface => "ACCOUNT_NOT_AUTHORIZED_FOR_SURFACE",
            AuthError::EmployeeInactive => "EMPLOYEE_INACTIVE",
            AuthError::EmployeeUnassigned => "EMPLOYEE_UNASSIGNED",
            AuthError::InsufficientRole => "INSUFFICIENT_ROLE",
            AuthError::SurfaceNotPermitted => "SURFACE_NOT_PERMITTED",
            AuthError::TenantRequired => "TENANT_REQUIRED",
            AuthError::BranchAccessDenied => "BRANCH_ACCESS_DENIED",
            AuthError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            AuthError::EmployeeNotFound => "EMPLOYEE_NOT_FOUND",
            AuthError::UserNotFound => "USER_NOT_FOUND",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AuthError::InvalidPhoneFormat
            | AuthError::MissingPhone
            | AuthError::MissingChallengeId => ErrorCategory::Validation,

            AuthError::ChallengeNotFound
            | AuthError::ChallengeExpired
            | AuthError::AttemptsExceeded
            | AuthError::InvalidOtp { .. }
            | AuthError::ResendLimitExceeded => ErrorCategory::Challenge,

            AuthError::SurfaceMismatch
            | AuthError::SurfaceScopeMismatch
            | AuthError::PhoneNotAllowlisted
            | AuthError::AccountNotAuthorizedForSurface
            | AuthError::EmployeeInactive
            | AuthError::EmployeeUnassigned
            | AuthError::InsufficientRole
            | AuthError::SurfaceNotPermitted
            | AuthError::TenantRequired
            | AuthError::BranchAccessDenied => ErrorCategory::Authorization,

            AuthError::AccountNotFound | AuthError::EmployeeNotFound | AuthError::UserNotFound => {
                ErrorCategory::NotFound
            }
        }
    }
}

/// Token and session errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Access token required")]
    AccessTokenRequired,

    #[error("Invalid access token")]
    InvalidAccessToken,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Refresh token revoked")]
    RefreshTokenRevoked,

    #[error("Session is no longer valid")]
    SessionInvalid,

    #[error("Session does not belong to token subject")]
    SessionUserMismatch,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Invalid session identifier")]
    InvalidSessionIdentifier,
}

impl TokenError {
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::AccessTokenRequired => "ACCESS_TOKEN_REQUIRED",
            TokenError::InvalidAccessToken => "INVALID_ACCESS_TOKEN",
            TokenError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            TokenError::RefreshTokenExpired => "REFRESH_TOKEN_EXPIRED",
            TokenError::RefreshTokenRevoked => "REFRESH_TOKEN_REVOKED",
            TokenError::SessionInvalid => "SESSION_INVALID",
            TokenError::SessionUserMismatch => "SESSION_USER_MISMATCH",
            TokenError::SessionNotFound => "SESSION_NOT_FOUND",
            TokenError::InvalidSessionIdentifier => "INVALID_SESSION_IDENTIFIER",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            // Raised only when the server itself mints a token for a bad session id
            TokenError::InvalidSessionIdentifier => ErrorCategory::Internal,
            _ => ErrorCategory::Authentication,
        }
    }
}
