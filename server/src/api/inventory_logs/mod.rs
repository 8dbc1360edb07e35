//! Inventory Log API module
//!
//! The audit read surface for farmers, plus the manual stock adjustment
//! escape hatch that pairs a ledger delta with its audit entry without
//! going through order settlement.

mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/inventory-logs",
        Router::new().route("/", get(handler::list).post(handler::adjust)),
    )
}
