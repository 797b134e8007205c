//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::AccountRole;
use super::status::AccountStatus;

/// A registered JobNest account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Unique email address; the login identifier.
    pub email: String,
    /// Argon2id password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role.
    pub role: AccountRole,
    /// Lifecycle status.
    pub status: AccountStatus,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
    /// Who created the account (an admin, or `None` for self-registration).
    pub created_by: Option<Uuid>,
    /// Who last modified the account.
    pub updated_by: Option<Uuid>,
}

impl Account {
    /// Public projection returned to clients.
    pub fn summary(&self) -> AccountSummary {
        AccountSummary::from(self)
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: AccountRole,
    /// Initial status.
    pub status: AccountStatus,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
}

/// Client-facing account view without credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    /// Account ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// Role.
    pub role: AccountRole,
    /// Status.
    pub status: AccountStatus,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Last successful login.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
            status: account.status,
            avatar_url: account.avatar_url.clone(),
            last_login_at: account.last_login_at,
            created_at: account.created_at,
        }
    }
}
