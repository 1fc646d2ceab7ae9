//! User entity (the subset the auth core reads and provisions).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Business role, distinct from the login surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    SalonOwner,
    SalonEmployee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::SalonOwner => "SALON_OWNER",
            Role::SalonEmployee => "SALON_EMPLOYEE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "SALON_OWNER" => Ok(Role::SalonOwner),
            "SALON_EMPLOYEE" => Ok(Role::SalonEmployee),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// How a user proves their identity. Exactly one kind per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Credential {
    /// Phone OTP login
    Phone { phone_number: String },
    /// Legacy email/password login; the hash never leaves the core
    Email { email: String, password_hash: String },
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub credential: Credential,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
    pub active_branch_id: Option<Uuid>,
    pub name: Option<String>,
    pub is_active: bool,
    pub is_onboarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates an active phone-credential user
    pub fn new_phone_user(phone_number: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            credential: Credential::Phone { phone_number },
            role,
            tenant_id: None,
            active_branch_id: None,
            name: None,
            is_active: true,
            is_onboarded: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn phone_number(&self) -> Option<&str> {
        match &self.credential {
            Credential::Phone { phone_number } => Some(phone_number),
            Credential::Email { .. } => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match &self.credential {
            Credential::Email { email, .. } => Some(email),
            Credential::Phone { .. } => None,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn assign_tenant(&mut self, tenant_id: Uuid) {
        self.tenant_id = Some(tenant_id);
        self.updated_at = Utc::now();
    }

    /// Public view without credential secrets
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            phone_number: self.phone_number().map(String::from),
            email: self.email().map(String::from),
            role: self.role,
            tenant_id: self.tenant_id,
            active_branch_id: self.active_branch_id,
            name: self.name.clone(),
            is_active: self.is_active,
            is_onboarded: self.is_onboarded,
        }
    }
}

/// Sanitized user returned to clients and attached to authenticated requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
    pub active_branch_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_active: bool,
    pub is_onboarded: bool,
}
