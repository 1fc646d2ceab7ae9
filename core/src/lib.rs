//! # Salon Core
//!
//! Domain layer of the salon authentication core: phone OTP challenges,
//! per-surface sessions and tokens, surface admission policy, and the
//! repository interfaces the infrastructure layer implements.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    Branch, ChallengeMeta, ChallengeStatus, Claims, Credential, LockReason, OtpChallenge,
    RefreshToken, RevocationReason, Role, Session, Surface, Tenant, TenantStatus, TokenPair,
    User, UserProfile,
};
pub use errors::{AuthError, DomainError, DomainResult, ErrorCategory, TokenError};
pub use services::{
    AccessScope, AuthResult, AuthService, AuthenticatedIdentity, ChallengeService,
    ChallengeServiceConfig, CleanupResult, CleanupService, IssuedChallenge, SessionService,
    SmsSender, SurfacePolicy, TokenService, TokenServiceConfig,
};
