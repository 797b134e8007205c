//! Federated identity verification (Google sign-in).

pub mod google;

use async_trait::async_trait;

use jobnest_auth::error::AuthResult;

pub use google::GoogleTokenVerifier;

/// An identity asserted by an external provider and verified by us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedIdentity {
    /// Provider-side subject identifier.
    pub subject: String,
    /// Verified email address.
    pub email: String,
    /// Display name, when the provider shares it.
    pub name: Option<String>,
    /// Profile picture URL, when the provider shares it.
    pub picture: Option<String>,
}

/// Verifies a provider credential and yields the identity it asserts.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Fails with `InvalidToken` when the credential is not acceptable.
    async fn verify(&self, credential: &str) -> AuthResult<FederatedIdentity>;
}
