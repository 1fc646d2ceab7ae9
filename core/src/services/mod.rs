//! Business services containing the authentication use cases.

pub mod auth;
pub mod challenge;
pub mod policy;
pub mod session;
pub mod sms;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthResult, AuthService, AuthenticatedIdentity};
pub use challenge::{
    ChallengeService, ChallengeServiceConfig, IssuedChallenge, OtpHasher, VerifiedChallenge,
};
pub use policy::{AccessScope, SurfacePolicy};
pub use session::SessionService;
pub use sms::{RecordingSmsSender, SmsSender};
pub use token::{CleanupResult, CleanupService, TokenService, TokenServiceConfig};
