//! Issues and consumes one-time action tokens for a single purpose.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use jobnest_core::config::AuthConfig;
use jobnest_database::store::{ConsumeOutcome, OneTimeTokenStore, TokenEffect};
use jobnest_entity::account::Account;
use jobnest_entity::token::{OneTimeToken, TokenPurpose};

use crate::error::{AuthError, AuthResult};

/// Issues single-use, expiring tokens for one purpose.
///
/// Consumption and the action it authorizes happen in one store call, so
/// two concurrent consumers cannot both apply the action.
#[derive(Clone)]
pub struct OneTimeTokenIssuer {
    store: Arc<dyn OneTimeTokenStore>,
    purpose: TokenPurpose,
    ttl: Duration,
}

impl std::fmt::Debug for OneTimeTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneTimeTokenIssuer")
            .field("purpose", &self.purpose)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl OneTimeTokenIssuer {
    /// Creates an issuer for `purpose` with the given lifetime.
    pub fn new(store: Arc<dyn OneTimeTokenStore>, purpose: TokenPurpose, ttl: Duration) -> Self {
        Self {
            store,
            purpose,
            ttl,
        }
    }

    /// Email verification issuer with the configured TTL.
    pub fn email_verification(store: Arc<dyn OneTimeTokenStore>, config: &AuthConfig) -> Self {
        Self::new(
            store,
            TokenPurpose::EmailVerification,
            Duration::hours(config.verification_token_ttl_hours as i64),
        )
    }

    /// Password reset issuer with the configured TTL.
    pub fn password_reset(store: Arc<dyn OneTimeTokenStore>, config: &AuthConfig) -> Self {
        Self::new(
            store,
            TokenPurpose::PasswordReset,
            Duration::hours(config.reset_token_ttl_hours as i64),
        )
    }

    /// How long issued tokens stay valid.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a new random token for the account.
    pub async fn issue(&self, account_id: Uuid) -> AuthResult<OneTimeToken> {
        self.issue_at(account_id, Utc::now()).await
    }

    /// [`Self::issue`] with an explicit issue time.
    pub async fn issue_at(&self, account_id: Uuid, now: DateTime<Utc>) -> AuthResult<OneTimeToken> {
        let token = Uuid::new_v4().to_string();
        let row = self
            .store
            .insert(self.purpose, account_id, &token, now + self.ttl)
            .await?;
        debug!(account_id = %account_id, purpose = ?self.purpose, "One-time token issued");
        Ok(row)
    }

    /// Checks that the token could be consumed right now, without using it.
    ///
    /// Lets callers reject a dead token before doing expensive work.
    /// [`Self::consume`] remains the authority.
    pub async fn check(&self, raw: &str) -> AuthResult<()> {
        self.check_at(raw, Utc::now()).await
    }

    /// [`Self::check`] evaluated at `now`.
    pub async fn check_at(&self, raw: &str, now: DateTime<Utc>) -> AuthResult<()> {
        match self.store.find_unused(self.purpose, raw).await? {
            None => Err(AuthError::TokenInvalid),
            Some(token) if token.is_expired_at(now) => Err(AuthError::TokenExpired),
            Some(_) => Ok(()),
        }
    }

    /// Consumes the token and applies `effect` to its owner.
    pub async fn consume(&self, raw: &str, effect: TokenEffect) -> AuthResult<Account> {
        self.consume_at(raw, effect, Utc::now()).await
    }

    /// [`Self::consume`] evaluated at `now`.
    ///
    /// Used and unknown tokens both fail with [`AuthError::TokenInvalid`].
    /// Expired tokens fail with [`AuthError::TokenExpired`] and stay unused.
    pub async fn consume_at(
        &self,
        raw: &str,
        effect: TokenEffect,
        now: DateTime<Utc>,
    ) -> AuthResult<Account> {
        match self.store.consume(self.purpose, raw, now, effect).await? {
            ConsumeOutcome::Consumed(account) => {
                info!(account_id = %account.id, purpose = ?self.purpose, "One-time token consumed");
                Ok(account)
            }
            ConsumeOutcome::NotFound => Err(AuthError::TokenInvalid),
            ConsumeOutcome::Expired => Err(AuthError::TokenExpired),
        }
    }
}
