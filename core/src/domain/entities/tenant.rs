//! Tenant and branch entities, read by the auth core for provisioning and scoping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenantStatus {
    /// Created by owner self-provisioning, onboarding not finished
    PendingSetup,
    Active,
    Suspended,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::PendingSetup => "PENDING_SETUP",
            TenantStatus::Active => "ACTIVE",
            TenantStatus::Suspended => "SUSPENDED",
        }
    }
}

impl FromStr for TenantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_SETUP" => Ok(TenantStatus::PendingSetup),
            "ACTIVE" => Ok(TenantStatus::Active),
            "SUSPENDED" => Ok(TenantStatus::Suspended),
            other => Err(format!("Unknown tenant status: {}", other)),
        }
    }
}

/// A salon organization; the unit of data isolation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: Option<String>,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Placeholder tenant for a newly provisioned owner
    pub fn pending_for_owner(owner_user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_user_id,
            name: None,
            status: TenantStatus::PendingSetup,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A physical location under a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Branch {
    pub fn new(tenant_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn belongs_to(&self, tenant_id: Uuid) -> bool {
        self.tenant_id == tenant_id
    }
}
