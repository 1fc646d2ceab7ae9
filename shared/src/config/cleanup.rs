//! Background cleanup configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Settings for the periodic reaper of expired auth records
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// Run the background task at all
    pub enabled: bool,

    /// Seconds between runs
    pub interval_seconds: u64,

    /// Records are kept this long past expiry or revocation
    pub grace_period_seconds: i64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 3600,
            grace_period_seconds: 24 * 60 * 60,
        }
    }
}

impl CleanupConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("CLEANUP_ENABLED", defaults.enabled),
            interval_seconds: env_or("CLEANUP_INTERVAL_SECS", defaults.interval_seconds),
            grace_period_seconds: env_or("CLEANUP_GRACE_PERIOD_SECS", defaults.grace_period_seconds),
        }
    }
}
