//! Result alias for handler and service signatures

use super::AppError;

/// Result type carrying [`AppError`]
pub type AppResult<T> = Result<T, AppError>;
