//! Refresh token ledger row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted refresh token. Only the hash of the raw token is stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// Row identifier.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// Base64 SHA-256 digest of the raw token.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// Client description supplied at login.
    pub device_info: Option<String>,
    /// Client IP supplied at login.
    pub ip_address: Option<String>,
    /// Hard expiry of the row.
    pub expires_at: DateTime<Utc>,
    /// Set on logout or explicit revocation.
    pub revoked: bool,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl RefreshToken {
    /// A token is usable iff it is not revoked and `now < expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }
}

/// Data required to record a freshly minted refresh token.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    /// Owning account.
    pub account_id: Uuid,
    /// Digest of the raw token.
    pub token_hash: String,
    /// Client description.
    pub device_info: Option<String>,
    /// Client IP.
    pub ip_address: Option<String>,
    /// Expiry.
    pub expires_at: DateTime<Utc>,
}
