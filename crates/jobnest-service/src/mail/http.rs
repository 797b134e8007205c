//! Dispatcher that POSTs mails to an HTTP mail API.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use jobnest_core::config::MailConfig;
use jobnest_core::error::{AppError, ErrorKind};
use jobnest_core::result::AppResult;

use super::{EmailDispatcher, MailMessage};

/// Delivers mails as JSON `{from, to, subject, text}` to `mail.api_url`.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
    app_url: String,
}

impl HttpMailer {
    /// Creates an HTTP dispatcher. Requires `mail.api_url`.
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        let api_url = config
            .api_url
            .clone()
            .ok_or_else(|| AppError::configuration("mail.api_url is required for the http provider"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build mail client", e)
            })?;

        Ok(Self {
            client,
            api_url,
            api_key: config.api_key.clone(),
            from: config.from_address.clone(),
            app_url: config.app_url.clone(),
        })
    }

    async fn deliver(&self, message: &MailMessage) -> AppResult<()> {
        let mut request = self.client.post(&self.api_url).json(message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Mail API request failed", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Mail API responded with {status}"
            )));
        }

        debug!(to = %message.to, subject = %message.subject, "Mail delivered");
        Ok(())
    }
}

#[async_trait]
impl EmailDispatcher for HttpMailer {
    async fn send_verification_email(
        &self,
        to: &str,
        token: &str,
        valid_for: chrono::Duration,
    ) -> AppResult<()> {
        self.deliver(&MailMessage::verification(&self.from, to, &self.app_url, token, valid_for))
            .await
    }

    async fn send_password_reset_email(
        &self,
        to: &str,
        token: &str,
        valid_for: chrono::Duration,
    ) -> AppResult<()> {
        self.deliver(&MailMessage::password_reset(&self.from, to, &self.app_url, token, valid_for))
            .await
    }
}
