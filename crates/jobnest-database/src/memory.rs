//! In-memory store implementing every store interface behind one Tokio mutex.
//!
//! Suitable for tests and single-node demos only. The single lock gives the
//! same guarantees the PostgreSQL unique indexes and row locks give.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use jobnest_core::error::{AppError, codes};
use jobnest_core::result::AppResult;
use jobnest_entity::account::{Account, AccountStatus, NewAccount};
use jobnest_entity::token::{NewRefreshToken, OneTimeToken, RefreshToken, TokenPurpose};

use crate::store::{
    AccountStore, ConsumeOutcome, OneTimeTokenStore, ProfileUpdate, RefreshTokenStore, StoreSet,
    TokenEffect,
};

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<Uuid, Account>,
    refresh_tokens: HashMap<String, RefreshToken>,
    one_time_tokens: HashMap<(TokenPurpose, String), OneTimeToken>,
}

impl MemoryState {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.accounts
            .values()
            .any(|a| Some(a.id) != except && a.email.eq_ignore_ascii_case(email))
    }

    fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        self.accounts
            .values()
            .any(|a| Some(a.id) != except && a.username.eq_ignore_ascii_case(username))
    }

    fn account_mut(&mut self, id: Uuid) -> AppResult<&mut Account> {
        self.accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }
}

/// In-memory implementation of [`AccountStore`], [`RefreshTokenStore`] and
/// [`OneTimeTokenStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All three store interfaces backed by this instance.
    pub fn stores(&self) -> StoreSet {
        StoreSet {
            accounts: Arc::new(self.clone()),
            refresh_tokens: Arc::new(self.clone()),
            one_time_tokens: Arc::new(self.clone()),
        }
    }

    /// Number of stored accounts.
    pub async fn account_count(&self) -> usize {
        self.state.lock().await.accounts.len()
    }

    /// Snapshot of a one-time token row, including used ones.
    pub async fn one_time_token(&self, purpose: TokenPurpose, token: &str) -> Option<OneTimeToken> {
        self.state
            .lock()
            .await
            .one_time_tokens
            .get(&(purpose, token.to_string()))
            .cloned()
    }

    /// Number of refresh token rows owned by the account.
    pub async fn refresh_token_count(&self, account_id: Uuid) -> usize {
        self.state
            .lock()
            .await
            .refresh_tokens
            .values()
            .filter(|t| t.account_id == account_id)
            .count()
    }
}

#[async_trait]
impl AccountStore for MemoryDatabase {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.state.lock().await.accounts.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|a| a.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.state.lock().await.email_taken(email, None))
    }

    async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        Ok(self.state.lock().await.username_taken(username, None))
    }

    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        let mut state = self.state.lock().await;

        if state.email_taken(&account.email, None) {
            return Err(AppError::conflict("Email already registered")
                .with_code(codes::DUPLICATE_EMAIL));
        }
        if state.username_taken(&account.username, None) {
            return Err(AppError::conflict("Username already taken")
                .with_code(codes::DUPLICATE_USERNAME));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            status: account.status,
            avatar_url: account.avatar_url,
            last_login_at: None,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
        };
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_status(&self, id: Uuid, status: AccountStatus) -> AppResult<Account> {
        let mut state = self.state.lock().await;
        let account = state.account_mut(id)?;
        account.status = status;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn activate_pending(&self, id: Uuid, password_hash: &str) -> AppResult<Option<Account>> {
        let mut state = self.state.lock().await;
        match state.accounts.get_mut(&id) {
            Some(account) if account.status == AccountStatus::Pending => {
                account.status = AccountStatus::Active;
                account.password_hash = password_hash.to_string();
                account.updated_at = Utc::now();
                Ok(Some(account.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let account = state.account_mut(id)?;
        account.password_hash = password_hash.to_string();
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(account) = state.accounts.get_mut(&id) {
            account.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Account> {
        let mut state = self.state.lock().await;
        if let Some(username) = &update.username {
            if state.username_taken(username, Some(id)) {
                return Err(AppError::conflict("Username already taken")
                    .with_code(codes::DUPLICATE_USERNAME));
            }
        }

        let account = state.account_mut(id)?;
        if let Some(username) = update.username {
            account.username = username;
        }
        if let Some(avatar_url) = update.avatar_url {
            account.avatar_url = Some(avatar_url);
        }
        account.updated_at = Utc::now();
        account.updated_by = Some(id);
        Ok(account.clone())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryDatabase {
    async fn insert(&self, token: NewRefreshToken) -> AppResult<RefreshToken> {
        let now = Utc::now();
        let row = RefreshToken {
            id: Uuid::new_v4(),
            account_id: token.account_id,
            token_hash: token.token_hash,
            device_info: token.device_info,
            ip_address: token.ip_address,
            expires_at: token.expires_at,
            revoked: false,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.state.lock().await;
        if state.refresh_tokens.contains_key(&row.token_hash) {
            return Err(AppError::database("Duplicate refresh token hash"));
        }
        state
            .refresh_tokens
            .insert(row.token_hash.clone(), row.clone());
        Ok(row)
    }

    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>> {
        Ok(self.state.lock().await.refresh_tokens.get(token_hash).cloned())
    }

    async fn revoke_by_hash(&self, token_hash: &str) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.refresh_tokens.get_mut(token_hash) {
            Some(row) => {
                row.revoked = true;
                row.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_account(&self, account_id: Uuid) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, t| t.account_id != account_id);
        Ok((before - state.refresh_tokens.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.refresh_tokens.len();
        state.refresh_tokens.retain(|_, t| t.expires_at >= now);
        Ok((before - state.refresh_tokens.len()) as u64)
    }
}

#[async_trait]
impl OneTimeTokenStore for MemoryDatabase {
    async fn insert(
        &self,
        purpose: TokenPurpose,
        account_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<OneTimeToken> {
        let row = OneTimeToken {
            id: Uuid::new_v4(),
            account_id,
            token: token.to_string(),
            expires_at,
            is_used: false,
            created_at: Utc::now(),
        };
        let mut state = self.state.lock().await;
        let key = (purpose, row.token.clone());
        if state.one_time_tokens.contains_key(&key) {
            return Err(AppError::database("Duplicate one-time token"));
        }
        state.one_time_tokens.insert(key, row.clone());
        Ok(row)
    }

    async fn find_unused(
        &self,
        purpose: TokenPurpose,
        token: &str,
    ) -> AppResult<Option<OneTimeToken>> {
        let state = self.state.lock().await;
        Ok(state
            .one_time_tokens
            .get(&(purpose, token.to_string()))
            .filter(|t| !t.is_used)
            .cloned())
    }

    async fn consume(
        &self,
        purpose: TokenPurpose,
        token: &str,
        now: DateTime<Utc>,
        effect: TokenEffect,
    ) -> AppResult<ConsumeOutcome> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let Some(row) = state
            .one_time_tokens
            .get_mut(&(purpose, token.to_string()))
            .filter(|t| !t.is_used)
        else {
            return Ok(ConsumeOutcome::NotFound);
        };

        if row.is_expired_at(now) {
            return Ok(ConsumeOutcome::Expired);
        }

        let account = state
            .accounts
            .get_mut(&row.account_id)
            .ok_or_else(|| AppError::internal("One-time token owner is missing"))?;

        row.is_used = true;
        match effect {
            TokenEffect::ActivateAccount => {
                if account.status == AccountStatus::Pending {
                    account.status = AccountStatus::Active;
                    account.updated_at = now;
                }
            }
            TokenEffect::SetPasswordHash(hash) => {
                account.password_hash = hash;
                account.updated_at = now;
            }
        }

        Ok(ConsumeOutcome::Consumed(account.clone()))
    }
}
