//! Revocable, expirable ledger of issued refresh tokens.
//!
//! Only a SHA-256 digest of each raw token is persisted, so the ledger
//! cannot be used to replay tokens if the store leaks.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use jobnest_core::result::AppResult;
use jobnest_database::store::RefreshTokenStore;
use jobnest_entity::account::Account;
use jobnest_entity::token::{NewRefreshToken, RefreshToken};

use crate::jwt::JwtEncoder;

/// Deterministic one-way digest of a raw token: base64 (standard alphabet)
/// of its SHA-256.
pub fn hash_token(raw: &str) -> String {
    STANDARD.encode(Sha256::digest(raw.as_bytes()))
}

/// Client details recorded alongside a refresh token.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// User agent or other device description.
    pub device_info: Option<String>,
    /// Remote address.
    pub ip_address: Option<String>,
}

/// A freshly minted refresh token and the ledger row recording its hash.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    /// The raw token handed to the client. Never persisted.
    pub raw: String,
    /// The stored row.
    pub record: RefreshToken,
}

/// Binds refresh tokens to revocable ledger rows.
#[derive(Clone)]
pub struct RefreshTokenLedger {
    store: Arc<dyn RefreshTokenStore>,
    encoder: Arc<JwtEncoder>,
}

impl std::fmt::Debug for RefreshTokenLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenLedger")
            .field("encoder", &self.encoder)
            .finish()
    }
}

impl RefreshTokenLedger {
    /// Creates a ledger over the given store. Row lifetime follows the
    /// encoder's refresh TTL.
    pub fn new(store: Arc<dyn RefreshTokenStore>, encoder: Arc<JwtEncoder>) -> Self {
        Self { store, encoder }
    }

    /// Mints a refresh token for the account and records its hash.
    pub async fn create(&self, account: &Account, client: ClientInfo) -> AppResult<IssuedRefreshToken> {
        self.create_at(account, client, Utc::now()).await
    }

    /// [`Self::create`] with an explicit issue time.
    pub async fn create_at(
        &self,
        account: &Account,
        client: ClientInfo,
        now: DateTime<Utc>,
    ) -> AppResult<IssuedRefreshToken> {
        let raw = self
            .encoder
            .issue_refresh_token_at(account.id, &account.email, now)?;

        let record = self
            .store
            .insert(NewRefreshToken {
                account_id: account.id,
                token_hash: hash_token(&raw),
                device_info: client.device_info,
                ip_address: client.ip_address,
                expires_at: now + self.encoder.refresh_ttl(),
            })
            .await?;

        debug!(account_id = %account.id, token_id = %record.id, "Refresh token recorded");
        Ok(IssuedRefreshToken { raw, record })
    }

    /// Whether the raw token is recorded, unrevoked and unexpired.
    pub async fn validate(&self, raw: &str) -> AppResult<bool> {
        self.validate_at(raw, Utc::now()).await
    }

    /// [`Self::validate`] evaluated at `now`.
    pub async fn validate_at(&self, raw: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let row = self.store.find_by_hash(&hash_token(raw)).await?;
        Ok(row.is_some_and(|r| r.is_valid_at(now)))
    }

    /// Marks the token revoked. Unknown tokens are ignored.
    pub async fn revoke(&self, raw: &str) -> AppResult<()> {
        if self.store.revoke_by_hash(&hash_token(raw)).await? {
            info!("Refresh token revoked");
        } else {
            debug!("Revocation requested for an unknown refresh token");
        }
        Ok(())
    }

    /// Deletes every ledger row owned by the account.
    pub async fn revoke_all_for_account(&self, account_id: Uuid) -> AppResult<u64> {
        let removed = self.store.delete_by_account(account_id).await?;
        info!(account_id = %account_id, removed = removed, "All refresh tokens revoked");
        Ok(removed)
    }

    /// Deletes rows with `expires_at < now`.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.store.delete_expired(now).await
    }
}
