//! Tenant repository trait. The auth core consumes tenant/branch lookups and
//! provisions a placeholder tenant for self-serve owners.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::tenant::{Branch, Tenant};
use crate::errors::DomainError;

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, DomainError>;

    /// The tenant owned by `owner_user_id`, if any
    async fn find_by_owner(&self, owner_user_id: Uuid) -> Result<Option<Tenant>, DomainError>;

    /// Insert a tenant unless its owner already has one.
    ///
    /// # Returns
    /// * `Ok(Tenant)` - The inserted tenant, or the owner's existing tenant
    async fn create_for_owner(&self, tenant: Tenant) -> Result<Tenant, DomainError>;

    async fn find_branch(&self, branch_id: Uuid) -> Result<Option<Branch>, DomainError>;
}
