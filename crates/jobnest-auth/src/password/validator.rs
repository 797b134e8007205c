//! Password policy enforcement for new passwords.

use jobnest_core::config::AuthConfig;

use crate::error::{AuthError, AuthResult};

/// Upper bound on accepted password length, in characters.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validates new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length.
    min_length: usize,
    /// Minimum zxcvbn score; 0 disables the entropy check.
    min_score: u8,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_score: config.password_min_score.min(4),
        }
    }

    /// Validates a password, reporting the first violation found.
    pub fn validate(&self, password: &str) -> AuthResult<()> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        if length > MAX_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
            )));
        }

        if self.min_score > 0 {
            let estimate = zxcvbn::zxcvbn(password, &[]);
            if (estimate.score() as u8) < self.min_score {
                return Err(AuthError::Validation(
                    "Password is too weak. Please use a stronger password.".into(),
                ));
            }
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(&self, old_password: &str, new_password: &str) -> AuthResult<()> {
        if old_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from the current password".into(),
            ));
        }
        Ok(())
    }
}
