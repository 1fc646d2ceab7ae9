//! Token service module
//!
//! - Session-bound HS256 access tokens
//! - Opaque, hashed, rotating refresh tokens
//! - Session revocation with cascading token revocation
//! - Background cleanup of expired records

mod cleanup;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, CleanupService};
pub use config::TokenServiceConfig;
pub use service::{hash_token, TokenService};
