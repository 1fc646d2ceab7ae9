//! MySQL implementation of the RefreshTokenRepository trait.
//!
//! Rotation revokes the predecessor with `WHERE revoked_at IS NULL` inside a
//! transaction; only the request that flips that row inserts a successor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Transaction};
use uuid::Uuid;

use salon_core::domain::entities::session::RevocationReason;
use salon_core::domain::entities::token::RefreshToken;
use salon_core::errors::DomainError;
use salon_core::repositories::RefreshTokenRepository;

use super::row::{db_err, get, get_opt_parsed, get_parsed, get_uuid};

/// MySQL implementation of RefreshTokenRepository
pub struct MySqlRefreshTokenRepository {
    pool: MySqlPool,
}

impl MySqlRefreshTokenRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_token(row: &MySqlRow) -> Result<RefreshToken, DomainError> {
        Ok(RefreshToken {
            id: get_uuid(row, "id")?,
            user_id: get_uuid(row, "user_id")?,
            session_id: get_uuid(row, "session_id")?,
            surface: get_parsed(row, "surface")?,
            token_hash: get(row, "token_hash")?,
            created_at: get(row, "created_at")?,
            expires_at: get(row, "expires_at")?,
            revoked_at: get(row, "revoked_at")?,
            revoked_reason: get_opt_parsed(row, "revoked_reason")?,
            replaced_by_token_hash: get(row, "replaced_by_token_hash")?,
            created_by_ip: get(row, "created_by_ip")?,
        })
    }

    async fn insert<'e, E>(executor: E, token: &RefreshToken) -> Result<(), DomainError>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (
                id, user_id, session_id, surface, token_hash, created_at, expires_at,
                revoked_at, revoked_reason, replaced_by_token_hash, created_by_ip
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(token.session_id.to_string())
        .bind(token.surface.as_str())
        .bind(&token.token_hash)
        .bind(token.created_at)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .bind(token.revoked_reason.map(|r| r.as_str()))
        .bind(&token.replaced_by_token_hash)
        .bind(&token.created_by_ip)
        .execute(executor)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn revoke_for_rotation(
        tx: &mut Transaction<'_, MySql>,
        old_hash: &str,
        successor_hash: &str,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = ?, revoked_reason = ?, replaced_by_token_hash = ?
            WHERE token_hash = ? AND revoked_at IS NULL
            "#,
        )
        .bind(Utc::now())
        .bind(RevocationReason::Rotated.as_str())
        .bind(successor_hash)
        .bind(old_hash)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RefreshTokenRepository for MySqlRefreshTokenRepository {
    async fn create(&self, token: &RefreshToken) -> Result<(), DomainError> {
        Self::insert(&self.pool, token).await?;
        tracing::debug!(session_id = %token.session_id, "Refresh token stored");
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, session_id, surface, token_hash, created_at, expires_at,
                   revoked_at, revoked_reason, replaced_by_token_hash, created_by_ip
            FROM refresh_tokens
            WHERE token_hash = ?
            LIMIT 1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn rotate(&self, old_hash: &str, successor: &RefreshToken) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        if !Self::revoke_for_rotation(&mut tx, old_hash, &successor.token_hash).await? {
            tx.rollback().await.map_err(db_err)?;
            return Ok(false);
        }

        Self::insert(&mut *tx, successor).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn revoke_by_session(
        &self,
        session_id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = ?, revoked_reason = ?
            WHERE session_id = ? AND revoked_at IS NULL
            "#,
        )
        .bind(at)
        .bind(reason.as_str())
        .bind(session_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < ?")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }
}
