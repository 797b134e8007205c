//! PostgreSQL repository implementations of the store interfaces.

pub mod account;
pub mod one_time_token;
pub mod refresh_token;

pub use account::AccountRepository;
pub use one_time_token::OneTimeTokenRepository;
pub use refresh_token::RefreshTokenRepository;

use jobnest_core::error::{AppError, ErrorKind};

/// Wrap a sqlx error as a database [`AppError`].
pub(crate) fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}
