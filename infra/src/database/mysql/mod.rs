//! MySQL repository implementations

mod row;

pub mod challenge_repository;
pub mod refresh_token_repository;
pub mod session_repository;
pub mod tenant_repository;
pub mod user_repository;

pub use challenge_repository::MySqlChallengeRepository;
pub use refresh_token_repository::MySqlRefreshTokenRepository;
pub use session_repository::MySqlSessionRepository;
pub use tenant_repository::MySqlTenantRepository;
pub use user_repository::MySqlUserRepository;
