//! Login surfaces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The login channel a token was issued for, independent of the user's business role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Surface {
    /// Platform admin console
    Admin,
    /// Salon owner app
    SalonOwner,
    /// Salon employee app
    SalonEmployee,
}

impl Surface {
    pub const ALL: [Surface; 3] = [Surface::Admin, Surface::SalonOwner, Surface::SalonEmployee];

    /// Stored and serialized form (`ADMIN`, `SALON_OWNER`, `SALON_EMPLOYEE`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Admin => "ADMIN",
            Surface::SalonOwner => "SALON_OWNER",
            Surface::SalonEmployee => "SALON_EMPLOYEE",
        }
    }

    /// URL path segment (`admin`, `salon-owner`, `salon-employee`)
    pub fn slug(&self) -> &'static str {
        match self {
            Surface::Admin => "admin",
            Surface::SalonOwner => "salon-owner",
            Surface::SalonEmployee => "salon-employee",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|surface| surface.slug() == slug)
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Surface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|surface| surface.as_str() == s)
            .ok_or_else(|| format!("Unknown surface: {}", s))
    }
}
