//! OTP challenge store
//!
//! Issues, verifies, rotates and locks one-time codes per (phone, surface):
//! - Codes are hashed with bcrypt before they are stored
//! - A new challenge supersedes any active one for the same pair
//! - Wrong-code attempts and resends are capped independently

mod config;
mod hasher;
mod service;

#[cfg(test)]
mod tests;

pub use config::ChallengeServiceConfig;
pub use hasher::OtpHasher;
pub use service::{ChallengeService, IssuedChallenge, VerifiedChallenge};
