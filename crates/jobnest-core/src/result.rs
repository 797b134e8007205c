//! Convenience result type alias for JobNest.

use crate::error::AppError;

/// A specialized `Result` type for JobNest operations.
pub type AppResult<T> = Result<T, AppError>;
