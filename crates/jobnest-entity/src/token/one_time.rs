//! Single-use action tokens for email verification and password reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Which flow a one-time token authorizes. Each purpose has its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Activates a pending account.
    EmailVerification,
    /// Overwrites the password hash.
    PasswordReset,
}

impl TokenPurpose {
    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            Self::EmailVerification => "email_verifications",
            Self::PasswordReset => "password_reset_tokens",
        }
    }
}

/// A one-time token row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OneTimeToken {
    /// Row identifier.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// Opaque random token value.
    pub token: String,
    /// Expiry; checked at consumption time, never swept.
    pub expires_at: DateTime<Utc>,
    /// Flips to true exactly once.
    pub is_used: bool,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl OneTimeToken {
    /// Whether the token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
