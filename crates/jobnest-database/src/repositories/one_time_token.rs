//! Email verification and password reset token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use jobnest_core::error::AppError;
use jobnest_core::result::AppResult;
use jobnest_entity::account::Account;
use jobnest_entity::token::{OneTimeToken, TokenPurpose};

use super::db_error;
use crate::store::{ConsumeOutcome, OneTimeTokenStore, TokenEffect};

/// Repository for one-time action tokens. Each purpose lives in its own table.
#[derive(Debug, Clone)]
pub struct OneTimeTokenRepository {
    pool: PgPool,
}

impl OneTimeTokenRepository {
    /// Create a new one-time token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OneTimeTokenStore for OneTimeTokenRepository {
    async fn insert(
        &self,
        purpose: TokenPurpose,
        account_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<OneTimeToken> {
        let sql = format!(
            "INSERT INTO {} (id, account_id, token, expires_at, is_used, created_at) \
             VALUES ($1, $2, $3, $4, FALSE, NOW()) RETURNING *",
            purpose.table()
        );
        sqlx::query_as::<_, OneTimeToken>(&sql)
            .bind(Uuid::new_v4())
            .bind(account_id)
            .bind(token)
            .bind(expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to insert one-time token"))
    }

    async fn find_unused(
        &self,
        purpose: TokenPurpose,
        token: &str,
    ) -> AppResult<Option<OneTimeToken>> {
        let sql = format!(
            "SELECT * FROM {} WHERE token = $1 AND is_used = FALSE",
            purpose.table()
        );
        sqlx::query_as::<_, OneTimeToken>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find one-time token"))
    }

    async fn consume(
        &self,
        purpose: TokenPurpose,
        token: &str,
        now: DateTime<Utc>,
        effect: TokenEffect,
    ) -> AppResult<ConsumeOutcome> {
        let table = purpose.table();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Row lock serializes concurrent consumers of the same token.
        let select = format!("SELECT * FROM {table} WHERE token = $1 AND is_used = FALSE FOR UPDATE");
        let Some(row) = sqlx::query_as::<_, OneTimeToken>(&select)
            .bind(token)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock one-time token"))?
        else {
            return Ok(ConsumeOutcome::NotFound);
        };

        if row.is_expired_at(now) {
            return Ok(ConsumeOutcome::Expired);
        }

        let mark_used = format!("UPDATE {table} SET is_used = TRUE WHERE id = $1");
        sqlx::query(&mark_used)
            .bind(row.id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to mark one-time token used"))?;

        match &effect {
            TokenEffect::ActivateAccount => {
                sqlx::query(
                    "UPDATE accounts SET status = 'ACTIVE', updated_at = NOW() \
                     WHERE id = $1 AND status = 'PENDING'",
                )
                .bind(row.account_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to activate account"))?;
            }
            TokenEffect::SetPasswordHash(hash) => {
                sqlx::query(
                    "UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(row.account_id)
                .bind(hash)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to reset password"))?;
            }
        }

        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(row.account_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to load token owner"))?
            .ok_or_else(|| AppError::internal("One-time token owner is missing"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit token consumption"))?;

        Ok(ConsumeOutcome::Consumed(account))
    }
}
