//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use jobnest_core::config::PasswordHashConfig;
use jobnest_core::error::AppError;

/// Handles password hashing and verification using Argon2id.
///
/// Hashing is deliberately slow; the async helpers run it on the blocking
/// thread pool.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash of a throwaway password, verified against when the account is
    /// unknown so that login timing does not reveal registered emails.
    dummy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher with the configured cost parameters.
    pub fn new(config: &PasswordHashConfig) -> Result<Self, AppError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut hasher = Self {
            argon2,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash_password("jobnest-dummy-password")?;
        Ok(hasher)
    }

    /// Hashes a plaintext password with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored PHC hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Burns one verification against the dummy hash. Always `false`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify_password(password, &self.dummy_hash);
        false
    }

    /// [`Self::hash_password`] on the blocking pool.
    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
    }

    /// [`Self::verify_password`] on the blocking pool.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let hasher = self.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
    }

    /// [`Self::verify_dummy`] on the blocking pool.
    pub async fn verify_dummy_blocking(&self, password: &str) -> bool {
        let hasher = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&password))
            .await
            .unwrap_or(false)
    }
}
