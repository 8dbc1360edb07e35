//! Shared utilities: error envelope, result alias, logging

pub mod error;
pub mod logger;
pub mod result;

pub use error::{ok, ok_with_message, AppError, AppResponse};
pub use result::AppResult;
