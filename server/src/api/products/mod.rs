//! Product API module
//!
//! Public catalog reads plus farmer-side listing management. Stock never
//! changes here; corrections go through the inventory adjustment endpoint.

mod handler;

use axum::{routing::get, Router};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/mine", get(handler::list_mine))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
}
