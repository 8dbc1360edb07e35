//! Inventory Module
//!
//! The authoritative stock counter and its append-only audit trail:
//!
//! - [`StockLedger`] - per-product stock, mutated only through a conditional
//!   apply-delta update that can never drive stock negative
//! - [`AuditLog`] - append-only history of every stock mutation with
//!   before/after snapshots
//! - [`InventoryService`] - manual adjustments (farmer replenishment and
//!   corrections) that pair a ledger delta with its audit entry

pub mod audit;
pub mod ledger;
pub mod service;

pub use audit::AuditLog;
pub use ledger::StockLedger;
pub use service::InventoryService;

use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::AppError;

/// Inventory error types
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock for {product}")]
    InsufficientStock { product: String },

    #[error("Invalid stock delta: {0}")]
    InvalidDelta(String),

    /// Audit arithmetic does not add up. This is a bug upstream, never a
    /// recoverable user error.
    #[error("Inventory log arithmetic violated: {0}")]
    Consistency(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<surrealdb::Error> for InventoryError {
    fn from(err: surrealdb::Error) -> Self {
        InventoryError::Storage(err.to_string())
    }
}

impl From<RepoError> for InventoryError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => InventoryError::NotFound(msg),
            RepoError::Validation(msg) => InventoryError::InvalidDelta(msg),
            RepoError::Database(msg) => InventoryError::Storage(msg),
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound(msg) => AppError::NotFound(msg),
            InventoryError::InsufficientStock { product } => {
                AppError::BusinessRule(format!("Insufficient stock for {product}"))
            }
            InventoryError::InvalidDelta(msg) => AppError::Validation(msg),
            InventoryError::Consistency(msg) => AppError::Consistency(msg),
            InventoryError::Storage(msg) => AppError::Database(msg),
        }
    }
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;
