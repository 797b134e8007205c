//! Role checks invoked explicitly by request handlers.

use jobnest_entity::account::AccountRole;

use crate::error::{AuthError, AuthResult};

/// Succeeds when the capability tag (`ROLE_*`) matches one of `allowed`.
pub fn require_capability(capability: &str, allowed: &[AccountRole]) -> AuthResult<()> {
    if allowed.iter().any(|role| role.capability() == capability) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(format!(
            "Capability {capability} is not sufficient for this action"
        )))
    }
}
