//! Authentication error taxonomy.

use thiserror::Error;

use jobnest_core::error::{AppError, ErrorKind, codes};

/// Failures surfaced by the identity core.
///
/// Login deliberately folds "unknown email" and "wrong password" into
/// [`AuthError::InvalidCredentials`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// Another account already uses this email.
    #[error("Email already registered")]
    DuplicateEmail,
    /// Another account already uses this username.
    #[error("Username already taken")]
    DuplicateUsername,
    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// The account has been blocked by an administrator.
    #[error("Account is blocked")]
    AccountBlocked,
    /// The account email has not been verified yet.
    #[error("Account email is not verified")]
    AccountPending,
    /// No account matches the given identifier.
    #[error("Account not found")]
    AccountNotFound,
    /// A signed token failed signature, format, type or expiry checks, or a
    /// refresh token is not in the ledger.
    #[error("Invalid or expired token")]
    InvalidToken,
    /// A one-time token does not exist or was already used.
    #[error("Invalid or already used token")]
    TokenInvalid,
    /// A one-time token exists but has expired.
    #[error("Token has expired")]
    TokenExpired,
    /// The request carries no principal.
    #[error("{0}")]
    Unauthorized(String),
    /// The principal lacks the required capability or does not own the resource.
    #[error("{0}")]
    Forbidden(String),
    /// Input rejected by policy.
    #[error("{0}")]
    Validation(String),
    /// Infrastructure failure (store, hashing, signing).
    #[error(transparent)]
    Internal(AppError),
}

/// Result alias for identity core operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Machine-readable code, when the variant has one.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::DuplicateEmail => Some(codes::DUPLICATE_EMAIL),
            Self::DuplicateUsername => Some(codes::DUPLICATE_USERNAME),
            Self::InvalidCredentials => Some(codes::INVALID_CREDENTIALS),
            Self::AccountBlocked => Some(codes::ACCOUNT_BLOCKED),
            Self::AccountPending => Some(codes::ACCOUNT_PENDING),
            Self::AccountNotFound => Some(codes::ACCOUNT_NOT_FOUND),
            Self::InvalidToken => Some(codes::INVALID_TOKEN),
            Self::TokenInvalid => Some(codes::TOKEN_INVALID),
            Self::TokenExpired => Some(codes::TOKEN_EXPIRED),
            Self::Unauthorized(_) => Some(codes::UNAUTHORIZED),
            Self::Forbidden(_) => Some(codes::FORBIDDEN),
            Self::Validation(_) => None,
            Self::Internal(e) => e.code,
        }
    }
}

/// Store conflicts carrying a duplicate code become the matching variant,
/// so a registration race lost at the unique index reports like the
/// pre-insert check.
impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.code {
            Some(codes::DUPLICATE_EMAIL) => Self::DuplicateEmail,
            Some(codes::DUPLICATE_USERNAME) => Self::DuplicateUsername,
            _ => Self::Internal(err),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let code = err.code();
        let message = err.to_string();
        let app = match err {
            AuthError::Internal(inner) => return inner,
            AuthError::DuplicateEmail | AuthError::DuplicateUsername => {
                AppError::conflict(message)
            }
            AuthError::InvalidCredentials
            | AuthError::AccountBlocked
            | AuthError::AccountPending
            | AuthError::InvalidToken
            | AuthError::Unauthorized(_) => AppError::authentication(message),
            AuthError::Forbidden(_) => AppError::authorization(message),
            AuthError::AccountNotFound => AppError::not_found(message),
            AuthError::TokenInvalid | AuthError::TokenExpired | AuthError::Validation(_) => {
                AppError::validation(message)
            }
        };
        match code {
            Some(code) => app.with_code(code),
            None => app,
        }
    }
}
