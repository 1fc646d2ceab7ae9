//! Authentication configuration module
//!
//! Covers JWT signing, per-surface token lifetimes, OTP challenge limits and the
//! admin phone allow-list.

use serde::{Deserialize, Serialize};

use super::{env_or, Environment};
use crate::utils::phone::{mask_phone, normalize_e164};

/// Secret used when `JWT_SECRET` is not provided. Rejected in production.
pub const DEFAULT_JWT_SECRET: &str = "dev-only-secret-change-me-in-production";

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// HMAC secret for HS256 signing
    pub secret: String,

    /// Token issuer (`iss`)
    pub issuer: String,

    /// Token audience (`aud`)
    pub audience: String,

    /// Clock skew tolerated when validating `exp`/`nbf`, in seconds
    #[serde(default)]
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_JWT_SECRET.to_string(),
            issuer: String::from("salon-auth"),
            audience: String::from("salon-api"),
            leeway_seconds: 0,
        }
    }
}

impl JwtConfig {
    /// Create a JWT configuration with a specific secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: env_or("JWT_SECRET", defaults.secret),
            issuer: env_or("JWT_ISSUER", defaults.issuer),
            audience: env_or("JWT_AUDIENCE", defaults.audience),
            leeway_seconds: env_or("JWT_LEEWAY_SECS", defaults.leeway_seconds),
        }
    }

    /// Whether the secret is the built-in development value
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// Access and refresh lifetimes for one login surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SurfaceTokenConfig {
    /// Access token lifetime in seconds
    pub access_ttl_seconds: i64,

    /// Refresh token lifetime in seconds
    pub refresh_ttl_seconds: i64,
}

impl SurfaceTokenConfig {
    pub const fn new(access_ttl_seconds: i64, refresh_ttl_seconds: i64) -> Self {
        Self {
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }
}

/// Token lifetimes for every surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct SurfaceTokenTtls {
    pub admin: SurfaceTokenConfig,
    pub salon_owner: SurfaceTokenConfig,
    pub salon_employee: SurfaceTokenConfig,
}

impl Default for SurfaceTokenTtls {
    fn default() -> Self {
        Self {
            admin: SurfaceTokenConfig::new(15 * 60, 24 * 60 * 60),
            salon_owner: SurfaceTokenConfig::new(15 * 60, 30 * 24 * 60 * 60),
            salon_employee: SurfaceTokenConfig::new(15 * 60, 7 * 24 * 60 * 60),
        }
    }
}

impl SurfaceTokenTtls {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            admin: SurfaceTokenConfig::new(
                env_or("ADMIN_ACCESS_TTL_SECS", defaults.admin.access_ttl_seconds),
                env_or("ADMIN_REFRESH_TTL_SECS", defaults.admin.refresh_ttl_seconds),
            ),
            salon_owner: SurfaceTokenConfig::new(
                env_or("SALON_OWNER_ACCESS_TTL_SECS", defaults.salon_owner.access_ttl_seconds),
                env_or("SALON_OWNER_REFRESH_TTL_SECS", defaults.salon_owner.refresh_ttl_seconds),
            ),
            salon_employee: SurfaceTokenConfig::new(
                env_or("SALON_EMPLOYEE_ACCESS_TTL_SECS", defaults.salon_employee.access_ttl_seconds),
                env_or(
                    "SALON_EMPLOYEE_REFRESH_TTL_SECS",
                    defaults.salon_employee.refresh_ttl_seconds,
                ),
            ),
        }
    }
}

/// OTP challenge configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Challenge lifetime in seconds
    pub ttl_seconds: i64,

    /// Wrong codes allowed before the challenge locks
    pub max_attempts: i32,

    /// Resends allowed per challenge chain
    pub max_resends: i32,

    /// bcrypt cost used to hash codes
    pub bcrypt_cost: u32,

    /// Fixed code used instead of a random one outside production
    #[serde(default)]
    pub test_code: Option<String>,
}

/// Lowest bcrypt cost accepted for OTP hashes in production
pub const MIN_PRODUCTION_BCRYPT_COST: u32 = 10;

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            max_attempts: 5,
            max_resends: 3,
            bcrypt_cost: MIN_PRODUCTION_BCRYPT_COST,
            test_code: None,
        }
    }
}

impl OtpConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_seconds: env_or("OTP_TTL_SECS", defaults.ttl_seconds),
            max_attempts: env_or("OTP_MAX_ATTEMPTS", defaults.max_attempts),
            max_resends: env_or("OTP_MAX_RESENDS", defaults.max_resends),
            bcrypt_cost: env_or("OTP_BCRYPT_COST", defaults.bcrypt_cost),
            test_code: std::env::var("OTP_TEST_CODE")
                .ok()
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty()),
        }
    }

    /// The fixed test code, only ever returned outside production
    pub fn test_code_for(&self, environment: Environment) -> Option<&str> {
        if environment.is_production() {
            return None;
        }
        self.test_code.as_deref()
    }

    /// bcrypt cost to use, clamped to the production floor where required
    pub fn effective_bcrypt_cost(&self, environment: Environment) -> u32 {
        if environment.is_production() {
            self.bcrypt_cost.max(MIN_PRODUCTION_BCRYPT_COST)
        } else {
            self.bcrypt_cost
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Per-surface token lifetimes
    pub tokens: SurfaceTokenTtls,

    /// OTP challenge limits
    pub otp: OtpConfig,

    /// Normalized E.164 phones allowed on the admin surface
    #[serde(default)]
    pub admin_allowlist: Vec<String>,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let raw = std::env::var("ADMIN_PHONE_ALLOWLIST").unwrap_or_default();
        Self {
            jwt: JwtConfig::from_env(),
            tokens: SurfaceTokenTtls::from_env(),
            otp: OtpConfig::from_env(),
            admin_allowlist: parse_allowlist(&raw),
        }
    }

    /// Startup checks for settings that must never reach production
    pub fn validate(&self, environment: Environment) -> Result<(), String> {
        if environment.is_production() {
            if self.jwt.uses_default_secret() {
                return Err("JWT_SECRET must be set in production".to_string());
            }
            if self.otp.test_code.is_some() {
                tracing::warn!("OTP_TEST_CODE is ignored in production");
            }
        }
        if self.otp.max_attempts < 1 {
            return Err("OTP_MAX_ATTEMPTS must be at least 1".to_string());
        }
        if self.otp.ttl_seconds < 1 {
            return Err("OTP_TTL_SECS must be positive".to_string());
        }
        Ok(())
    }
}

/// Parse a comma-separated allow-list, normalizing every entry to E.164
pub fn parse_allowlist(raw: &str) -> Vec<String> {
    let mut phones = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match normalize_e164(entry) {
            Ok(phone) => {
                if !phones.contains(&phone) {
                    phones.push(phone);
                }
            }
            Err(_) => {
                tracing::warn!(phone = %mask_phone(entry), "Skipping invalid admin allow-list entry");
            }
        }
    }
    phones
}
