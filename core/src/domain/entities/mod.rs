//! Domain entities representing core business objects.

pub mod challenge;
pub mod session;
pub mod surface;
pub mod tenant;
pub mod token;
pub mod user;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use challenge::{
    generate_otp_code, is_well_formed_code, ChallengeMeta, ChallengeStatus, LockReason,
    OtpChallenge, OTP_CODE_LENGTH,
};
pub use session::{RevocationReason, Session};
pub use surface::Surface;
pub use tenant::{Branch, Tenant, TenantStatus};
pub use token::{Claims, RefreshToken, TokenPair, ACCESS_TOKEN_TYPE, REFRESH_TOKEN_BYTES};
pub use user::{Credential, Role, User, UserProfile};
