//! The authenticated principal attached to a request.

use serde::Serialize;
use uuid::Uuid;

use jobnest_auth::error::AuthResult;
use jobnest_auth::rbac;
use jobnest_entity::account::{Account, AccountRole, AccountSummary};

/// Identity attached to a request by the authentication gate.
///
/// Handlers receive it explicitly and check capabilities through
/// [`Principal::require_capability`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// The account as loaded when the request was admitted.
    pub account: AccountSummary,
    /// Capability tag derived from the role, e.g. `ROLE_ADMIN`.
    pub capability: &'static str,
}

impl Principal {
    /// Builds a principal from a loaded account.
    pub fn from_account(account: &Account) -> Self {
        Self {
            account: account.summary(),
            capability: account.role.capability(),
        }
    }

    /// The account ID.
    pub fn id(&self) -> Uuid {
        self.account.id
    }

    /// Fails with `Forbidden` unless the principal holds one of the roles.
    pub fn require_capability(&self, allowed: &[AccountRole]) -> AuthResult<()> {
        rbac::require_capability(self.capability, allowed)
    }
}
