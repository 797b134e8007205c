//! Inputs and outputs of [`AuthService`](super::AuthService) operations.

use serde::Serialize;

use jobnest_entity::account::{AccountRole, AccountSummary};

/// Data supplied at self-registration.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Requested role; CANDIDATE when absent.
    pub role: Option<AccountRole>,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The stored account.
    pub account: AccountSummary,
    /// The email verification token that was mailed.
    pub verification_token: String,
}

/// Tokens and profile returned by password or federated login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token recorded in the ledger.
    pub refresh_token: String,
    /// The account that logged in.
    pub account: AccountSummary,
}

/// Tokens returned by a refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResult {
    /// Newly minted access token.
    pub access_token: String,
    /// The presented refresh token, unchanged.
    pub refresh_token: String,
}
