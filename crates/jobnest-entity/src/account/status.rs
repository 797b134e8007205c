//! Account status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an account.
///
/// `PENDING -> ACTIVE` on email verification, `ACTIVE <-> BLOCKED` by an
/// administrator. Only `ACTIVE` accounts may authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    /// Registered, email not yet verified.
    Pending,
    /// Verified and allowed to log in.
    Active,
    /// Blocked by an administrator.
    Blocked,
}

impl AccountStatus {
    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
