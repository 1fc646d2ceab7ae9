//! In-memory implementation of TenantRepository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::tenant::{Branch, Tenant};
use crate::errors::DomainError;

use super::r#trait::TenantRepository;

#[derive(Clone, Default)]
pub struct InMemoryTenantRepository {
    tenants: Arc<RwLock<HashMap<Uuid, Tenant>>>,
    branches: Arc<RwLock<HashMap<Uuid, Branch>>>,
}

impl InMemoryTenantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_tenant(&self, tenant: Tenant) {
        self.tenants.write().await.insert(tenant.id, tenant);
    }

    pub async fn insert_branch(&self, branch: Branch) {
        self.branches.write().await.insert(branch.id, branch);
    }

    pub async fn tenant_count(&self) -> usize {
        self.tenants.read().await.len()
    }
}

#[async_trait]
impl TenantRepository for InMemoryTenantRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, DomainError> {
        Ok(self.tenants.read().await.get(&id).cloned())
    }

    async fn find_by_owner(&self, owner_user_id: Uuid) -> Result<Option<Tenant>, DomainError> {
        Ok(self
            .tenants
            .read()
            .await
            .values()
            .find(|t| t.owner_user_id == owner_user_id)
            .cloned())
    }

    async fn create_for_owner(&self, tenant: Tenant) -> Result<Tenant, DomainError> {
        let mut tenants = self.tenants.write().await;
        if let Some(existing) = tenants.values().find(|t| t.owner_user_id == tenant.owner_user_id) {
            return Ok(existing.clone());
        }
        tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn find_branch(&self, branch_id: Uuid) -> Result<Option<Branch>, DomainError> {
        Ok(self.branches.read().await.get(&branch_id).cloned())
    }
}
