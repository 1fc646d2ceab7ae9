//! Surface admission policy implementation

use std::collections::HashSet;
use std::sync::Arc;

use salon_shared::utils::phone::mask_phone;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::surface::Surface;
use crate::domain::entities::tenant::Tenant;
use crate::domain::entities::user::{Role, User};
use crate::errors::{AuthError, DomainResult};
use crate::repositories::{TenantRepository, UserRepository};

/// Tenant/branch context attached to tenant-scoped requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessScope {
    pub tenant_id: Uuid,
    pub branch_id: Option<Uuid>,
}

/// Decides who may log in on each surface and provisions self-serve owners
pub struct SurfacePolicy {
    users: Arc<dyn UserRepository>,
    tenants: Arc<dyn TenantRepository>,
    admin_allowlist: HashSet<String>,
}

impl SurfacePolicy {
    /// # Arguments
    ///
    /// * `users` - User lookups and owner provisioning
    /// * `tenants` - Tenant provisioning for the owner surface
    /// * `admin_allowlist` - Normalized E.164 phones allowed on the admin surface
    pub fn new(
        users: Arc<dyn UserRepository>,
        tenants: Arc<dyn TenantRepository>,
        admin_allowlist: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            users,
            tenants,
            admin_allowlist: admin_allowlist.into_iter().collect(),
        }
    }

    pub fn is_admin_allowlisted(&self, phone: &str) -> bool {
        self.admin_allowlist.contains(phone)
    }

    pub fn ensure_admin_allowed(&self, phone: &str) -> DomainResult<()> {
        if self.is_admin_allowlisted(phone) {
            Ok(())
        } else {
            tracing::warn!(
                phone = %mask_phone(phone),
                event = "admin_phone_rejected",
                "Phone not on admin allow-list"
            );
            Err(AuthError::PhoneNotAllowlisted.into())
        }
    }

    /// Resolve (and for owners, provision) the user behind a verified phone
    pub async fn admit(&self, surface: Surface, phone: &str) -> DomainResult<User> {
        match surface {
            Surface::Admin => self.admit_admin(phone).await,
            Surface::SalonOwner => self.admit_owner(phone).await,
            Surface::SalonEmployee => self.admit_employee(phone).await,
        }
    }

    async fn admit_admin(&self, phone: &str) -> DomainResult<User> {
        self.ensure_admin_allowed(phone)?;

        let user = self
            .users
            .find_by_phone(phone)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !user.has_role(Role::Admin) || !user.is_active {
            return Err(AuthError::AccountNotAuthorizedForSurface.into());
        }
        Ok(user)
    }

    /// First login creates the user and a pending tenant; later logins only fill gaps.
    ///
    /// Admins and staff attached to a tenant they do not own are refused rather
    /// than rewritten into owners.
    async fn admit_owner(&self, phone: &str) -> DomainResult<User> {
        let mut user = self
            .users
            .create_or_get_by_phone(User::new_phone_user(phone.to_string(), Role::SalonOwner))
            .await?;

        if !user.is_active || user.has_role(Role::Admin) {
            return Err(AuthError::AccountNotAuthorizedForSurface.into());
        }

        let owned = self.tenants.find_by_owner(user.id).await?;
        if let Some(tenant_id) = user.tenant_id {
            if owned.as_ref().map(|t| t.id) != Some(tenant_id) {
                tracing::warn!(
                    user_id = %user.id,
                    tenant_id = %tenant_id,
                    event = "owner_admission_refused",
                    "User belongs to a tenant they do not own"
                );
                return Err(AuthError::AccountNotAuthorizedForSurface.into());
            }
        }

        let mut changed = false;
        if !user.has_role(Role::SalonOwner) {
            tracing::info!(
                user_id = %user.id,
                previous_role = %user.role,
                event = "owner_role_upgraded",
                "Upgrading user to salon owner"
            );
            user.set_role(Role::SalonOwner);
            changed = true;
        }

        if user.tenant_id.is_none() {
            let tenant = match owned {
                Some(tenant) => tenant,
                None => {
                    let tenant = self
                        .tenants
                        .create_for_owner(Tenant::pending_for_owner(user.id))
                        .await?;
                    tracing::info!(
                        user_id = %user.id,
                        tenant_id = %tenant.id,
                        event = "tenant_provisioned",
                        "Provisioned pending tenant for owner"
                    );
                    tenant
                }
            };
            user.assign_tenant(tenant.id);
            changed = true;
        }

        if changed {
            self.users.update(&user).await?;
        }
        Ok(user)
    }

    /// Tenant and branch an authenticated user may act on
    ///
    /// `requested_branch` is the raw `X-Branch-Id` value. Without it the user's
    /// active branch is used, if any.
    pub async fn resolve_scope(
        &self,
        user: &User,
        requested_branch: Option<&str>,
    ) -> DomainResult<AccessScope> {
        let tenant_id = user.tenant_id.ok_or(AuthError::TenantRequired)?;

        let branch_id = match requested_branch.map(str::trim).filter(|b| !b.is_empty()) {
            Some(raw) => {
                let branch_id =
                    Uuid::parse_str(raw).map_err(|_| AuthError::BranchAccessDenied)?;
                let branch = self
                    .tenants
                    .find_branch(branch_id)
                    .await?
                    .filter(|b| b.is_active && b.belongs_to(tenant_id))
                    .ok_or_else(|| {
                        tracing::warn!(
                            user_id = %user.id,
                            tenant_id = %tenant_id,
                            branch_id = %branch_id,
                            event = "branch_access_denied",
                            "Branch outside caller tenant"
                        );
                        AuthError::BranchAccessDenied
                    })?;
                Some(branch.id)
            }
            None => user.active_branch_id,
        };

        Ok(AccessScope {
            tenant_id,
            branch_id,
        })
    }

    async fn admit_employee(&self, phone: &str) -> DomainResult<User> {
        let user = self
            .users
            .find_by_phone(phone)
            .await?
            .ok_or(AuthError::EmployeeNotFound)?;

        if !user.is_active {
            return Err(AuthError::EmployeeInactive.into());
        }
        if user.tenant_id.is_none() {
            return Err(AuthError::EmployeeUnassigned.into());
        }
        Ok(user)
    }
}
