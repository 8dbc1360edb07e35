//! Settlement error taxonomy
//!
//! Validation and domain errors are recovered at the workflow boundary and
//! returned as structured failure responses. Consistency violations and
//! transaction aborts are infrastructure failures: the whole order fails.

use thiserror::Error;

use crate::db::repository::RepoError;
use crate::inventory::InventoryError;
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum SettlementError {
    // ========== Validation (no side effects) ==========
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid quantity for {product}")]
    InvalidQuantity { product: String },

    #[error("All delivery address fields are required")]
    IncompleteAddress,

    #[error("Only one farmer per order is allowed")]
    MultipleFarmers,

    // ========== Domain ==========
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Insufficient stock for {product}")]
    InsufficientStock { product: String },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Not allowed to modify this order")]
    NotOwner,

    #[error("Cannot cancel order that is already shipped or delivered")]
    NotCancellable,

    #[error("Order is already cancelled")]
    AlreadyCancelled,

    #[error("Payment verification failed")]
    PaymentRejected,

    // ========== Infrastructure ==========
    #[error("Consistency violation: {0}")]
    Consistency(String),

    #[error("Transaction failed: {0}")]
    TransactionAbort(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<InventoryError> for SettlementError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound(msg) => SettlementError::ProductNotFound(msg),
            InventoryError::InsufficientStock { product } => {
                SettlementError::InsufficientStock { product }
            }
            InventoryError::InvalidDelta(msg) => SettlementError::Storage(msg),
            InventoryError::Consistency(msg) => SettlementError::Consistency(msg),
            InventoryError::Storage(msg) => SettlementError::Storage(msg),
        }
    }
}

impl From<RepoError> for SettlementError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => SettlementError::OrderNotFound(msg),
            RepoError::Validation(msg) => SettlementError::Storage(msg),
            RepoError::Database(msg) => SettlementError::Storage(msg),
        }
    }
}

impl From<surrealdb::Error> for SettlementError {
    fn from(err: surrealdb::Error) -> Self {
        SettlementError::Storage(err.to_string())
    }
}

impl From<SettlementError> for AppError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::EmptyCart
            | SettlementError::InvalidQuantity { .. }
            | SettlementError::IncompleteAddress
            | SettlementError::MultipleFarmers => AppError::Validation(err.to_string()),

            SettlementError::InsufficientStock { .. } => AppError::BusinessRule(err.to_string()),

            SettlementError::NotCancellable | SettlementError::AlreadyCancelled => {
                AppError::BusinessRule(err.to_string())
            }

            SettlementError::ProductNotFound(msg) => AppError::NotFound(msg),
            SettlementError::OrderNotFound(msg) => AppError::NotFound(msg),

            SettlementError::NotOwner => {
                AppError::Forbidden("Not allowed to modify this order".into())
            }

            SettlementError::PaymentRejected => AppError::PaymentRejected,

            SettlementError::Consistency(msg) => AppError::Consistency(msg),
            SettlementError::TransactionAbort(msg) => AppError::Database(msg),
            SettlementError::Storage(msg) => AppError::Database(msg),
        }
    }
}
