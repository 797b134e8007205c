//! Google ID token verification through the tokeninfo endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use jobnest_auth::error::{AuthError, AuthResult};
use jobnest_core::config::AuthConfig;
use jobnest_core::error::{AppError, ErrorKind};

use super::{FederatedIdentity, IdentityVerifier};

/// Subset of the tokeninfo response we rely on.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<Value>,
    name: Option<String>,
    picture: Option<String>,
}

impl TokenInfo {
    /// tokeninfo reports `email_verified` as the string `"true"`; accept a
    /// JSON boolean too.
    fn email_verified(&self) -> bool {
        match &self.email_verified {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

/// Verifies Google ID tokens and checks they were minted for our client id.
#[derive(Debug, Clone)]
pub struct GoogleTokenVerifier {
    client: reqwest::Client,
    tokeninfo_url: String,
    client_id: Option<String>,
}

impl GoogleTokenVerifier {
    /// Creates a verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            tokeninfo_url: config.google_tokeninfo_url.clone(),
            client_id: config.google_client_id.clone(),
        })
    }

    fn check(&self, info: TokenInfo, client_id: &str) -> AuthResult<FederatedIdentity> {
        if info.aud != client_id {
            warn!(aud = %info.aud, "Google token issued for another client");
            return Err(AuthError::InvalidToken);
        }
        if !info.email_verified() {
            debug!(sub = %info.sub, "Google account email is not verified");
            return Err(AuthError::InvalidToken);
        }
        let email = info.email.ok_or(AuthError::InvalidToken)?;

        Ok(FederatedIdentity {
            subject: info.sub,
            email,
            name: info.name,
            picture: info.picture,
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleTokenVerifier {
    async fn verify(&self, credential: &str) -> AuthResult<FederatedIdentity> {
        let Some(client_id) = self.client_id.as_deref() else {
            return Err(AuthError::Internal(AppError::service_unavailable(
                "Google sign-in is not configured",
            )));
        };
        // ID tokens are base64url segments joined by dots; no escaping needed.
        if credential.is_empty()
            || !credential
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(AuthError::InvalidToken);
        }

        let url = format!("{}?id_token={credential}", self.tokeninfo_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            AuthError::Internal(AppError::with_source(
                ErrorKind::ExternalService,
                "Google token verification request failed",
                e,
            ))
        })?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Google rejected the ID token");
            return Err(AuthError::InvalidToken);
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            debug!(error = %e, "Unreadable tokeninfo response");
            AuthError::InvalidToken
        })?;

        self.check(info, client_id)
    }
}
