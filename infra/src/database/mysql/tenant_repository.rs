//! MySQL implementation of the TenantRepository trait.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use salon_core::domain::entities::tenant::{Branch, Tenant};
use salon_core::errors::DomainError;
use salon_core::repositories::TenantRepository;

use super::row::{db_err, get, get_parsed, get_uuid};

const SELECT_TENANT: &str = r#"
    SELECT id, owner_user_id, name, status, created_at, updated_at
    FROM tenants
"#;

/// MySQL implementation of TenantRepository
pub struct MySqlTenantRepository {
    pool: MySqlPool,
}

impl MySqlTenantRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_tenant(row: &MySqlRow) -> Result<Tenant, DomainError> {
        Ok(Tenant {
            id: get_uuid(row, "id")?,
            owner_user_id: get_uuid(row, "owner_user_id")?,
            name: get(row, "name")?,
            status: get_parsed(row, "status")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        })
    }

    fn row_to_branch(row: &MySqlRow) -> Result<Branch, DomainError> {
        Ok(Branch {
            id: get_uuid(row, "id")?,
            tenant_id: get_uuid(row, "tenant_id")?,
            name: get(row, "name")?,
            is_active: get(row, "is_active")?,
            created_at: get(row, "created_at")?,
        })
    }
}

#[async_trait]
impl TenantRepository for MySqlTenantRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_TENANT);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(Self::row_to_tenant).transpose()
    }

    async fn find_by_owner(&self, owner_user_id: Uuid) -> Result<Option<Tenant>, DomainError> {
        let query = format!("{} WHERE owner_user_id = ? LIMIT 1", SELECT_TENANT);
        let row = sqlx::query(&query)
            .bind(owner_user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(Self::row_to_tenant).transpose()
    }

    async fn create_for_owner(&self, tenant: Tenant) -> Result<Tenant, DomainError> {
        // uq_tenants_owner keeps one tenant per owner under concurrent first logins
        sqlx::query(
            r#"
            INSERT INTO tenants (id, owner_user_id, name, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE id = id
            "#,
        )
        .bind(tenant.id.to_string())
        .bind(tenant.owner_user_id.to_string())
        .bind(&tenant.name)
        .bind(tenant.status.as_str())
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.find_by_owner(tenant.owner_user_id)
            .await?
            .ok_or_else(|| DomainError::internal("Tenant vanished after upsert"))
    }

    async fn find_branch(&self, branch_id: Uuid) -> Result<Option<Branch>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, tenant_id, name, is_active, created_at
            FROM branches
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(branch_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(Self::row_to_branch).transpose()
    }
}
