//! Refresh token ledger repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use jobnest_core::result::AppResult;
use jobnest_entity::token::{NewRefreshToken, RefreshToken};

use super::db_error;
use crate::store::RefreshTokenStore;

/// Repository for hashed refresh token rows.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    /// Create a new refresh token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for RefreshTokenRepository {
    async fn insert(&self, token: NewRefreshToken) -> AppResult<RefreshToken> {
        sqlx::query_as::<_, RefreshToken>(
            r#"INSERT INTO refresh_tokens
                (id, account_id, token_hash, device_info, ip_address, expires_at, revoked, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, FALSE, NOW(), NOW())
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(token.account_id)
        .bind(&token.token_hash)
        .bind(&token.device_info)
        .bind(&token.ip_address)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to insert refresh token"))
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find refresh token"))
    }

    async fn revoke_by_hash(&self, token_hash: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE, updated_at = NOW() WHERE token_hash = $1",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to revoke refresh token"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_account(&self, account_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE account_id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete account refresh tokens"))?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete expired refresh tokens"))?;
        Ok(result.rows_affected())
    }
}
