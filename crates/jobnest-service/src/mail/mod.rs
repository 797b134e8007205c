//! Account mail dispatch.
//!
//! Dispatch is fire-and-forget for callers: [`AuthService`] logs failures
//! and carries on.
//!
//! [`AuthService`]: crate::auth::AuthService

pub mod http;
pub mod log;
pub mod message;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use jobnest_core::config::{MailConfig, MailProvider};
use jobnest_core::result::AppResult;

pub use self::http::HttpMailer;
pub use self::log::LogMailer;
pub use self::message::MailMessage;

/// Sends the two account mails.
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    /// Sends the email verification link to `to`. `valid_for` is the token
    /// lifetime quoted in the mail.
    async fn send_verification_email(&self, to: &str, token: &str, valid_for: Duration)
    -> AppResult<()>;

    /// Sends the password reset link to `to`.
    async fn send_password_reset_email(
        &self,
        to: &str,
        token: &str,
        valid_for: Duration,
    ) -> AppResult<()>;
}

/// Builds the dispatcher selected by `mail.provider`.
pub fn build_mailer(config: &MailConfig) -> AppResult<Arc<dyn EmailDispatcher>> {
    match config.provider {
        MailProvider::Log => Ok(Arc::new(LogMailer::new(config))),
        MailProvider::Http => Ok(Arc::new(HttpMailer::new(config)?)),
    }
}
