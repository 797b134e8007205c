//! Dispatcher that writes mails to the log.

use async_trait::async_trait;
use chrono::Duration;
use tracing::info;

use jobnest_core::config::MailConfig;
use jobnest_core::result::AppResult;

use super::{EmailDispatcher, MailMessage};

/// Logs each mail instead of delivering it. Used in development and tests.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
    app_url: String,
}

impl LogMailer {
    /// Creates a log dispatcher.
    pub fn new(config: &MailConfig) -> Self {
        Self {
            from: config.from_address.clone(),
            app_url: config.app_url.clone(),
        }
    }

    fn emit(&self, message: &MailMessage) {
        info!(to = %message.to, subject = %message.subject, body = %message.text, "Mail (log dispatcher)");
    }
}

#[async_trait]
impl EmailDispatcher for LogMailer {
    async fn send_verification_email(
        &self,
        to: &str,
        token: &str,
        valid_for: Duration,
    ) -> AppResult<()> {
        self.emit(&MailMessage::verification(&self.from, to, &self.app_url, token, valid_for));
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        to: &str,
        token: &str,
        valid_for: Duration,
    ) -> AppResult<()> {
        self.emit(&MailMessage::password_reset(&self.from, to, &self.app_url, token, valid_for));
        Ok(())
    }
}
