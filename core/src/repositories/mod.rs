//! Repository traits for auth persistence, plus in-memory implementations
//! used by tests and local development.

pub mod challenge;
pub mod session;
pub mod tenant;
pub mod token;
pub mod user;

pub use challenge::{ChallengeRepository, InMemoryChallengeRepository};
pub use session::{InMemorySessionRepository, SessionRepository};
pub use tenant::{InMemoryTenantRepository, TenantRepository};
pub use token::{InMemoryRefreshTokenRepository, RefreshTokenRepository};
pub use user::{InMemoryUserRepository, UserRepository};
