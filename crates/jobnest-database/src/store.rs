//! Store interfaces consumed by the identity core.
//!
//! Each interface has a PostgreSQL implementation in [`crate::repositories`]
//! and an in-memory implementation in [`crate::memory`]. All coordination
//! (uniqueness, single-use token consumption) is the store's job; callers
//! never lock.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use jobnest_core::result::AppResult;
use jobnest_entity::account::{Account, AccountStatus, NewAccount};
use jobnest_entity::token::{NewRefreshToken, OneTimeToken, RefreshToken, TokenPurpose};

/// Profile fields an account holder may change. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New username.
    pub username: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<String>,
}

/// Account mutation applied in the same transaction that marks a one-time
/// token used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenEffect {
    /// `PENDING -> ACTIVE`. Accounts in any other status are left unchanged.
    ActivateAccount,
    /// Overwrite the password hash.
    SetPasswordHash(String),
}

/// Result of a one-time token consumption attempt.
#[derive(Debug, Clone)]
pub enum ConsumeOutcome {
    /// The token was flipped to used and the effect applied.
    Consumed(Account),
    /// No unused token with this value exists.
    NotFound,
    /// The token exists and is unused but has expired. It was not flipped.
    Expired,
}

/// Persistence for accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find an account by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Find an account by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Find an account by username (case-insensitive).
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    /// Whether an account with this email exists.
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    /// Whether an account with this username exists.
    async fn exists_by_username(&self, username: &str) -> AppResult<bool>;

    /// Insert a new account.
    ///
    /// A uniqueness violation fails with a conflict carrying
    /// `DUPLICATE_EMAIL` or `DUPLICATE_USERNAME`.
    async fn create(&self, account: NewAccount) -> AppResult<Account>;

    /// Set the account status. Fails with not-found for an unknown id.
    async fn update_status(&self, id: Uuid, status: AccountStatus) -> AppResult<Account>;

    /// `PENDING -> ACTIVE` and replace the password hash in one step.
    ///
    /// Returns `None`, changing nothing, when the account is not PENDING.
    async fn activate_pending(&self, id: Uuid, password_hash: &str) -> AppResult<Option<Account>>;

    /// Overwrite the password hash.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;

    /// Record a successful login.
    async fn update_last_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Apply a profile update.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<Account>;
}

/// Persistence for the refresh token ledger.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Record a new refresh token.
    async fn insert(&self, token: NewRefreshToken) -> AppResult<RefreshToken>;

    /// Look up a row by token hash.
    async fn find_by_hash(&self, token_hash: &str) -> AppResult<Option<RefreshToken>>;

    /// Mark the row revoked. Returns whether a row matched.
    async fn revoke_by_hash(&self, token_hash: &str) -> AppResult<bool>;

    /// Delete every row owned by the account. Returns the number deleted.
    async fn delete_by_account(&self, account_id: Uuid) -> AppResult<u64>;

    /// Delete rows with `expires_at < now`. Returns the number deleted.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Persistence for email verification and password reset tokens.
#[async_trait]
pub trait OneTimeTokenStore: Send + Sync {
    /// Record a newly issued token.
    async fn insert(
        &self,
        purpose: TokenPurpose,
        account_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<OneTimeToken>;

    /// Look up an unused token by value. Used tokens are invisible. Expired
    /// ones are returned.
    async fn find_unused(&self, purpose: TokenPurpose, token: &str)
    -> AppResult<Option<OneTimeToken>>;

    /// Atomically flip an unused, unexpired token to used and apply `effect`
    /// to the owning account.
    async fn consume(
        &self,
        purpose: TokenPurpose,
        token: &str,
        now: DateTime<Utc>,
        effect: TokenEffect,
    ) -> AppResult<ConsumeOutcome>;
}

/// The three stores the identity core is wired with.
#[derive(Clone)]
pub struct StoreSet {
    /// Account store.
    pub accounts: Arc<dyn AccountStore>,
    /// Refresh token ledger store.
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    /// Verification and reset token store.
    pub one_time_tokens: Arc<dyn OneTimeTokenStore>,
}

impl std::fmt::Debug for StoreSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSet").finish_non_exhaustive()
    }
}
