//! Payment API module
//!
//! Creating a charge intent with the gateway, and the verified placement
//! path (Workflow B) that only settles after the signature gate accepts.

mod handler;

use axum::{routing::post, Router};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", payment_routes())
}

fn payment_routes() -> Router<ServerState> {
    Router::new()
        .route("/create-order", post(handler::create_intent))
        .route("/verify", post(handler::verify_and_place))
}
