//! Account repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use jobnest_core::error::{AppError, ErrorKind, codes};
use jobnest_core::result::AppResult;
use jobnest_entity::account::{Account, AccountStatus, NewAccount};

use super::db_error;
use crate::store::{AccountStore, ProfileUpdate};

/// Repository for account persistence.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Create a new account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate a unique-index violation into the matching duplicate conflict.
pub(crate) fn map_unique_violation(err: sqlx::Error, context: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.constraint() {
            Some("accounts_email_key") => {
                return AppError::conflict("Email already registered")
                    .with_code(codes::DUPLICATE_EMAIL);
            }
            Some("accounts_username_key") => {
                return AppError::conflict("Username already taken")
                    .with_code(codes::DUPLICATE_USERNAME);
            }
            _ => {}
        }
    }
    AppError::with_source(ErrorKind::Database, context, err)
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find account by id"))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find account by email"))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find account by username"))
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check email"))
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check username"))
    }

    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            r#"INSERT INTO accounts
                (id, username, email, password_hash, role, status, avatar_url, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role)
        .bind(account.status)
        .bind(&account.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Failed to create account"))
    }

    async fn update_status(&self, id: Uuid, status: AccountStatus) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update account status"))?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn activate_pending(&self, id: Uuid, password_hash: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>(
            r#"UPDATE accounts
               SET status = 'ACTIVE', password_hash = $2, updated_at = NOW()
               WHERE id = $1 AND status = 'PENDING'
               RETURNING *"#,
        )
        .bind(id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to activate pending account"))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update password"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Account {id} not found")));
        }
        Ok(())
    }

    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE accounts SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update last login"))?;
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            r#"UPDATE accounts
               SET username = COALESCE($2, username),
                   avatar_url = COALESCE($3, avatar_url),
                   updated_at = NOW(),
                   updated_by = $1
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&update.username)
        .bind(&update.avatar_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Failed to update profile"))?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }
}
