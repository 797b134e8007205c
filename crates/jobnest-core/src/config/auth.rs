//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// How a password reset request for an unknown email is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownEmailPolicy {
    /// Fail with `ACCOUNT_NOT_FOUND`.
    Reject,
    /// Report success without issuing a token.
    Ignore,
}

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: u64,
    /// Refresh token TTL in days. Also the ledger row lifetime.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: u64,
    /// Accepted clock skew when checking `exp`, in seconds.
    #[serde(default)]
    pub jwt_leeway_seconds: u64,
    /// Email verification token TTL in hours.
    #[serde(default = "default_verification_ttl")]
    pub verification_token_ttl_hours: u64,
    /// Password reset token TTL in hours.
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_hours: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn score (0-4). 0 disables the entropy check.
    #[serde(default)]
    pub password_min_score: u8,
    /// Argon2id cost parameters.
    #[serde(default)]
    pub password_hash: PasswordHashConfig,
    /// Activate accounts on registration instead of waiting for email verification.
    #[serde(default)]
    pub auto_activate: bool,
    /// Behavior of the password reset request for an unknown email.
    #[serde(default = "default_unknown_email")]
    pub reset_unknown_email: UnknownEmailPolicy,
    /// Google OAuth client id; federated login is disabled when unset.
    #[serde(default)]
    pub google_client_id: Option<String>,
    /// Google token introspection endpoint.
    #[serde(default = "default_google_tokeninfo")]
    pub google_tokeninfo_url: String,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordHashConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Degree of parallelism.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_days: default_refresh_ttl(),
            jwt_leeway_seconds: 0,
            verification_token_ttl_hours: default_verification_ttl(),
            reset_token_ttl_hours: default_reset_ttl(),
            password_min_length: default_password_min(),
            password_min_score: 0,
            password_hash: PasswordHashConfig::default(),
            auto_activate: false,
            reset_unknown_email: default_unknown_email(),
            google_client_id: None,
            google_tokeninfo_url: default_google_tokeninfo(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    60
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_verification_ttl() -> u64 {
    24
}

fn default_reset_ttl() -> u64 {
    1
}

fn default_password_min() -> usize {
    8
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_unknown_email() -> UnknownEmailPolicy {
    UnknownEmailPolicy::Reject
}

fn default_google_tokeninfo() -> String {
    "https://oauth2.googleapis.com/tokeninfo".to_string()
}
