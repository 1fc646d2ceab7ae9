//! MySQL implementation of the ChallengeRepository trait.
//!
//! Every transition is an `UPDATE ... WHERE status = 'ACTIVE'`; the affected row
//! count tells the caller whether it won a race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Transaction};
use uuid::Uuid;

use salon_core::domain::entities::challenge::{ChallengeMeta, LockReason, OtpChallenge};
use salon_core::errors::DomainError;
use salon_core::repositories::ChallengeRepository;

use super::row::{db_err, get, get_opt_parsed, get_parsed, get_uuid};

const SELECT_COLUMNS: &str = r#"
    SELECT id, phone, surface, otp_hash, expires_at, attempts, max_attempts, status,
           resend_count, lock_reason, request_ip, user_agent, created_at, updated_at
    FROM otp_challenges
"#;

/// MySQL implementation of ChallengeRepository
pub struct MySqlChallengeRepository {
    pool: MySqlPool,
}

impl MySqlChallengeRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_challenge(row: &MySqlRow) -> Result<OtpChallenge, DomainError> {
        Ok(OtpChallenge {
            id: get_uuid(row, "id")?,
            phone: get(row, "phone")?,
            surface: get_parsed(row, "surface")?,
            otp_hash: get(row, "otp_hash")?,
            expires_at: get(row, "expires_at")?,
            attempts: get(row, "attempts")?,
            max_attempts: get(row, "max_attempts")?,
            status: get_parsed(row, "status")?,
            resend_count: get(row, "resend_count")?,
            lock_reason: get_opt_parsed(row, "lock_reason")?,
            meta: ChallengeMeta::new(get(row, "request_ip")?, get(row, "user_agent")?),
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        })
    }

    /// Lock the other `ACTIVE` challenges of the same (phone, surface)
    async fn supersede(
        tx: &mut Transaction<'_, MySql>,
        challenge: &OtpChallenge,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE otp_challenges
            SET status = 'LOCKED', lock_reason = ?, updated_at = ?
            WHERE phone = ? AND surface = ? AND status = 'ACTIVE' AND id <> ?
            "#,
        )
        .bind(LockReason::Superseded.as_str())
        .bind(Utc::now())
        .bind(&challenge.phone)
        .bind(challenge.surface.as_str())
        .bind(challenge.id.to_string())
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected())
    }

    async fn insert(
        tx: &mut Transaction<'_, MySql>,
        challenge: &OtpChallenge,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO otp_challenges (
                id, phone, surface, otp_hash, expires_at, attempts, max_attempts, status,
                resend_count, lock_reason, request_ip, user_agent, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(challenge.id.to_string())
        .bind(&challenge.phone)
        .bind(challenge.surface.as_str())
        .bind(&challenge.otp_hash)
        .bind(challenge.expires_at)
        .bind(challenge.attempts)
        .bind(challenge.max_attempts)
        .bind(challenge.status.as_str())
        .bind(challenge.resend_count)
        .bind(challenge.lock_reason.map(|r| r.as_str()))
        .bind(&challenge.meta.ip)
        .bind(&challenge.meta.user_agent)
        .bind(challenge.created_at)
        .bind(challenge.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl ChallengeRepository for MySqlChallengeRepository {
    async fn replace_active(&self, challenge: &OtpChallenge) -> Result<u64, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let superseded = Self::supersede(&mut tx, challenge).await?;
        Self::insert(&mut tx, challenge).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(superseded)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OtpChallenge>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(Self::row_to_challenge).transpose()
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<Option<OtpChallenge>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        // MySQL applies SET assignments left to right, so later ones see the new count
        let result = sqlx::query(
            r#"
            UPDATE otp_challenges
            SET attempts = attempts + 1,
                lock_reason = IF(attempts >= max_attempts, ?, lock_reason),
                status = IF(attempts >= max_attempts, 'LOCKED', status),
                updated_at = ?
            WHERE id = ? AND status = 'ACTIVE'
            "#,
        )
        .bind(LockReason::MaxAttempts.as_str())
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(db_err)?;
            return Ok(None);
        }

        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;

        row.as_ref().map(Self::row_to_challenge).transpose()
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE otp_challenges
            SET status = 'USED', updated_at = ?
            WHERE id = ? AND status = 'ACTIVE' AND attempts < max_attempts
            "#,
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn lock(&self, id: Uuid, reason: LockReason) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE otp_challenges
            SET status = 'LOCKED', lock_reason = ?, updated_at = ?
            WHERE id = ? AND status = 'ACTIVE'
            "#,
        )
        .bind(reason.as_str())
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn rotate(&self, old_id: Uuid, replacement: &OtpChallenge) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            r#"
            UPDATE otp_challenges
            SET status = 'LOCKED', lock_reason = ?, updated_at = ?
            WHERE id = ? AND status = 'ACTIVE'
            "#,
        )
        .bind(LockReason::Rotated.as_str())
        .bind(Utc::now())
        .bind(old_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(db_err)?;
            return Ok(false);
        }

        Self::supersede(&mut tx, replacement).await?;
        Self::insert(&mut tx, replacement).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM otp_challenges WHERE expires_at < ?")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }
}
