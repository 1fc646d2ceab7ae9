//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management and embedded migrations
//! - Repository implementations for the auth core's persistence traits

pub mod connection;
pub mod mysql;

// Re-export commonly used types
pub use connection::DatabasePool;
pub use mysql::{
    MySqlChallengeRepository, MySqlRefreshTokenRepository, MySqlSessionRepository,
    MySqlTenantRepository, MySqlUserRepository,
};
