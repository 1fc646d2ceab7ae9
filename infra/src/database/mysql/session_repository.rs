//! MySQL implementation of the SessionRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use salon_core::domain::entities::session::{RevocationReason, Session};
use salon_core::domain::entities::surface::Surface;
use salon_core::errors::DomainError;
use salon_core::repositories::SessionRepository;

use super::row::{db_err, get, get_opt_parsed, get_parsed, get_uuid};

/// MySQL implementation of SessionRepository
pub struct MySqlSessionRepository {
    pool: MySqlPool,
}

impl MySqlSessionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_session(row: &MySqlRow) -> Result<Session, DomainError> {
        Ok(Session {
            id: get_uuid(row, "id")?,
            user_id: get_uuid(row, "user_id")?,
            surface: get_parsed(row, "surface")?,
            is_active: get(row, "is_active")?,
            created_by_ip: get(row, "created_by_ip")?,
            user_agent: get(row, "user_agent")?,
            created_at: get(row, "created_at")?,
            last_used_at: get(row, "last_used_at")?,
            revoked_at: get(row, "revoked_at")?,
            revoked_reason: get_opt_parsed(row, "revoked_reason")?,
        })
    }
}

#[async_trait]
impl SessionRepository for MySqlSessionRepository {
    async fn create(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, user_id, surface, is_active, created_by_ip, user_agent,
                created_at, last_used_at, revoked_at, revoked_reason
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(session.surface.as_str())
        .bind(session.is_active)
        .bind(&session.created_by_ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.last_used_at)
        .bind(session.revoked_at)
        .bind(session.revoked_reason.map(|r| r.as_str()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        tracing::debug!(session_id = %session.id, "Session row inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, surface, is_active, created_by_ip, user_agent,
                   created_at, last_used_at, revoked_at, revoked_reason
            FROM sessions
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn touch(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE sessions SET last_used_at = ? WHERE id = ? AND is_active = TRUE",
        )
        .bind(at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        // MySQL reports 0 affected rows when the value is unchanged, so re-check
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        Ok(self.find_by_id(id).await?.map_or(false, |s| s.is_active))
    }

    async fn revoke(
        &self,
        id: Uuid,
        reason: RevocationReason,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET is_active = FALSE, revoked_at = ?, revoked_reason = ?
            WHERE id = ? AND is_active = TRUE
            "#,
        )
        .bind(at)
        .bind(reason.as_str())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn expire_idle(
        &self,
        surface: Surface,
        idle_before: DateTime<Utc>,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET is_active = FALSE, revoked_at = ?, revoked_reason = ?
            WHERE is_active = TRUE AND surface = ? AND last_used_at < ?
            "#,
        )
        .bind(at)
        .bind(RevocationReason::Expired.as_str())
        .bind(surface.as_str())
        .bind(idle_before)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected())
    }

    async fn delete_revoked_before(&self, before: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "DELETE FROM sessions WHERE is_active = FALSE AND revoked_at < ?",
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected())
    }
}
