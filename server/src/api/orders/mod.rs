//! Order API module
//!
//! Placement and cancellation go through the settlement coordinator;
//! delivery transitions go through the order aggregate's forward-only
//! state machine.

mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/cod", post(handler::place_cod))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/status", post(handler::update_status))
}
