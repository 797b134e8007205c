//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use jobnest_core::config::AuthConfig;
use jobnest_core::error::AppError;
use jobnest_entity::account::AccountRole;

use super::claims::{Claims, TokenType};

/// Creates signed JWT access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Access token TTL.
    access_ttl: Duration,
    /// Refresh token TTL.
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_token_ttl_minutes as i64),
            refresh_ttl: Duration::days(config.refresh_token_ttl_days as i64),
        }
    }

    /// Refresh token lifetime, shared with the ledger row expiry.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Signs a short-lived access token carrying the role claim.
    pub fn issue_access_token(
        &self,
        subject: Uuid,
        email: &str,
        role: AccountRole,
    ) -> Result<String, AppError> {
        self.issue_access_token_at(subject, email, role, Utc::now())
    }

    /// [`Self::issue_access_token`] with an explicit issue time.
    pub fn issue_access_token_at(
        &self,
        subject: Uuid,
        email: &str,
        role: AccountRole,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            sub: subject,
            email: email.to_string(),
            role: Some(role),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Access,
        };
        self.sign(&claims)
    }

    /// Signs a long-lived refresh token without a role claim.
    pub fn issue_refresh_token(&self, subject: Uuid, email: &str) -> Result<String, AppError> {
        self.issue_refresh_token_at(subject, email, Utc::now())
    }

    /// [`Self::issue_refresh_token`] with an explicit issue time.
    pub fn issue_refresh_token_at(
        &self,
        subject: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            sub: subject,
            email: email.to_string(),
            role: None,
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Refresh,
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| {
            AppError::internal(format!("Failed to encode {:?} token: {e}", claims.token_type))
        })
    }
}
