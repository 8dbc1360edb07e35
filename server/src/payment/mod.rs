//! Payment Module
//!
//! The two collaborator-facing pieces of online payment:
//!
//! - [`PaymentGateway`] - creates charge intents against the external
//!   gateway's REST API
//! - [`SignatureVerifier`] - validates the gateway's payment assertion
//!   before any order settlement may begin

pub mod gateway;
pub mod verify;

pub use gateway::{PaymentGateway, PaymentIntent};
pub use verify::SignatureVerifier;

use thiserror::Error;

use crate::utils::AppError;

/// Payment error types
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Gateway rejected the request: {0}")]
    Gateway(String),

    #[error("Gateway transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        PaymentError::Transport(err.to_string())
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Gateway(msg) => {
                AppError::Internal(format!("payment gateway error: {msg}"))
            }
            PaymentError::Transport(msg) => {
                AppError::Internal(format!("payment gateway unreachable: {msg}"))
            }
        }
    }
}
