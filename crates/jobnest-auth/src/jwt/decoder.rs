//! JWT token verification.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;
use uuid::Uuid;

use jobnest_core::config::AuthConfig;

use super::claims::{Claims, TokenType};
use crate::error::{AuthError, AuthResult};

/// Verifies JWT signatures, expiry and token type.
///
/// Every failure is reported as [`AuthError::InvalidToken`]; the underlying
/// reason is only logged.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.jwt_leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Checks signature, format and expiry of a token of either type.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(reason = ?e.kind(), "Token verification failed");
                AuthError::InvalidToken
            })
    }

    /// Verifies a token and requires it to be an access token.
    pub fn verify_access(&self, token: &str) -> AuthResult<Claims> {
        self.verify_typed(token, TokenType::Access)
    }

    /// Verifies a token and requires it to be a refresh token.
    pub fn verify_refresh(&self, token: &str) -> AuthResult<Claims> {
        self.verify_typed(token, TokenType::Refresh)
    }

    /// Email claim of a verified token.
    pub fn extract_email(&self, token: &str) -> AuthResult<String> {
        self.verify(token).map(|claims| claims.email)
    }

    /// Subject claim of a verified token.
    pub fn extract_subject_id(&self, token: &str) -> AuthResult<Uuid> {
        self.verify(token).map(|claims| claims.sub)
    }

    fn verify_typed(&self, token: &str, expected: TokenType) -> AuthResult<Claims> {
        let claims = self.verify(token)?;
        if claims.token_type != expected {
            debug!(expected = ?expected, actual = ?claims.token_type, "Unexpected token type");
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}
