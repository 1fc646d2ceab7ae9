//! Configuration for the token service

use salon_shared::config::{JwtConfig, SurfaceTokenConfig, SurfaceTokenTtls};

use crate::domain::entities::surface::Surface;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Expected and issued `iss`
    pub issuer: String,
    /// Expected and issued `aud`
    pub audience: String,
    /// Clock skew tolerance in seconds
    pub leeway_seconds: u64,
    /// Per-surface lifetimes
    pub ttls: SurfaceTokenTtls,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from_shared(&JwtConfig::default(), SurfaceTokenTtls::default())
    }
}

impl TokenServiceConfig {
    pub fn from_shared(jwt: &JwtConfig, ttls: SurfaceTokenTtls) -> Self {
        Self {
            jwt_secret: jwt.secret.clone(),
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            leeway_seconds: jwt.leeway_seconds,
            ttls,
        }
    }

    /// Lifetimes for one surface
    pub fn for_surface(&self, surface: Surface) -> SurfaceTokenConfig {
        surface_ttl(&self.ttls, surface)
    }
}

/// Pick one surface's lifetimes out of the shared table
pub fn surface_ttl(ttls: &SurfaceTokenTtls, surface: Surface) -> SurfaceTokenConfig {
    match surface {
        Surface::Admin => ttls.admin,
        Surface::SalonOwner => ttls.salon_owner,
        Surface::SalonEmployee => ttls.salon_employee,
    }
}
