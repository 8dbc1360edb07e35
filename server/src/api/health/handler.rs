//! Health API handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::{ok, AppResponse, AppResult};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Which settlement strategy this process runs with
    pub atomicity: &'static str,
}

pub async fn health(State(state): State<ServerState>) -> AppResult<Json<AppResponse<HealthResponse>>> {
    Ok(ok(HealthResponse {
        status: "ok",
        atomicity: state.atomicity().as_str(),
    }))
}
