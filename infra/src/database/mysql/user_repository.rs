//! MySQL implementation of the UserRepository trait.
//!
//! The credential sum type is flattened into `credential_kind` plus nullable
//! phone/email/password columns; a CHECK constraint keeps them consistent.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use salon_core::domain::entities::user::{Credential, User};
use salon_core::errors::DomainError;
use salon_core::repositories::UserRepository;

use super::row::{db_err, get, get_opt_uuid, get_parsed, get_uuid};
use crate::InfrastructureError;

const SELECT_COLUMNS: &str = r#"
    SELECT id, credential_kind, phone_number, email, password_hash, role, tenant_id,
           active_branch_id, name, is_active, is_onboarded, created_at, updated_at
    FROM users
"#;

const KIND_PHONE: &str = "phone";
const KIND_EMAIL: &str = "email";

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_credential(row: &MySqlRow) -> Result<Credential, DomainError> {
        let kind: String = get(row, "credential_kind")?;
        let phone_number: Option<String> = get(row, "phone_number")?;
        let email: Option<String> = get(row, "email")?;
        let password_hash: Option<String> = get(row, "password_hash")?;

        match (kind.as_str(), phone_number, email, password_hash) {
            (KIND_PHONE, Some(phone_number), _, _) => Ok(Credential::Phone { phone_number }),
            (KIND_EMAIL, _, Some(email), Some(password_hash)) => {
                Ok(Credential::Email { email, password_hash })
            }
            _ => Err(InfrastructureError::Corrupt(format!(
                "users.credential_kind '{}' without matching columns",
                kind
            ))
            .into()),
        }
    }

    fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
        Ok(User {
            id: get_uuid(row, "id")?,
            credential: Self::row_to_credential(row)?,
            role: get_parsed(row, "role")?,
            tenant_id: get_opt_uuid(row, "tenant_id")?,
            active_branch_id: get_opt_uuid(row, "active_branch_id")?,
            name: get(row, "name")?,
            is_active: get(row, "is_active")?,
            is_onboarded: get(row, "is_onboarded")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        })
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        value: String,
    ) -> Result<Option<User>, DomainError> {
        let query = format!("{} WHERE {} LIMIT 1", SELECT_COLUMNS, clause);
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("id = ?", id.to_string()).await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DomainError> {
        self.fetch_one_where("phone_number = ?", phone.to_string()).await
    }

    async fn create_or_get_by_phone(&self, user: User) -> Result<User, DomainError> {
        let phone = user
            .phone_number()
            .ok_or_else(|| DomainError::internal("Phone user without phone credential"))?
            .to_string();

        // The unique phone index turns a concurrent duplicate into a no-op
        sqlx::query(
            r#"
            INSERT INTO users (
                id, credential_kind, phone_number, email, password_hash, role, tenant_id,
                active_branch_id, name, is_active, is_onboarded, created_at, updated_at
            ) VALUES (?, ?, ?, NULL, NULL, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE id = id
            "#,
        )
        .bind(user.id.to_string())
        .bind(KIND_PHONE)
        .bind(&phone)
        .bind(user.role.as_str())
        .bind(user.tenant_id.map(|id| id.to_string()))
        .bind(user.active_branch_id.map(|id| id.to_string()))
        .bind(&user.name)
        .bind(user.is_active)
        .bind(user.is_onboarded)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.find_by_phone(&phone)
            .await?
            .ok_or_else(|| DomainError::internal("User vanished after upsert"))
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = ?, tenant_id = ?, active_branch_id = ?, name = ?,
                is_active = ?, is_onboarded = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(user.role.as_str())
        .bind(user.tenant_id.map(|id| id.to_string()))
        .bind(user.active_branch_id.map(|id| id.to_string()))
        .bind(&user.name)
        .bind(user.is_active)
        .bind(user.is_onboarded)
        .bind(user.updated_at)
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 && self.find_by_id(user.id).await?.is_none() {
            return Err(DomainError::internal(format!("User {} does not exist", user.id)));
        }
        Ok(())
    }
}
