//! Outbound mail configuration.

use serde::{Deserialize, Serialize};

/// Which dispatcher delivers account mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Write the mail (including its link) to the log only.
    Log,
    /// POST the mail to an HTTP mail API.
    Http,
}

/// Mail dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Dispatcher backend.
    #[serde(default = "default_provider")]
    pub provider: MailProvider,
    /// Public URL of the web frontend; links in mails point here.
    #[serde(default = "default_app_url")]
    pub app_url: String,
    /// Sender address.
    #[serde(default = "default_from")]
    pub from_address: String,
    /// Endpoint of the HTTP mail API (provider = "http").
    #[serde(default)]
    pub api_url: Option<String>,
    /// Bearer key for the HTTP mail API.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout for the HTTP mail API in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            app_url: default_app_url(),
            from_address: default_from(),
            api_url: None,
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_provider() -> MailProvider {
    MailProvider::Log
}

fn default_app_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_from() -> String {
    "no-reply@jobnest.local".to_string()
}

fn default_timeout() -> u64 {
    10
}
