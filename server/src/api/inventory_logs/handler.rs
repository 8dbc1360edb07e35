//! Inventory Log API handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{InventoryLogEntry, InventoryLogType, Product};
use crate::db::repository::inventory_log::InventoryLogFilter;
use crate::db::repository::parse_record_ref;
use crate::utils::{ok, AppError, AppResponse, AppResult};

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub product_id: Option<String>,
    #[serde(rename = "type")]
    pub log_type: Option<InventoryLogType>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Admin-only: inspect another farmer's trail
    pub farmer_id: Option<String>,
}

/// GET /api/inventory-logs - audit trail, newest first
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<LogQuery>,
) -> AppResult<Json<AppResponse<Vec<InventoryLogEntry>>>> {
    user.require_farmer()?;

    let farmer = match (query.farmer_id, user.is_admin()) {
        (Some(raw), true) => parse_record_ref("user", &raw)
            .ok_or_else(|| AppError::validation("invalid farmer_id"))?,
        _ => user.id.clone(),
    };

    let product = match query.product_id {
        Some(raw) => Some(
            parse_record_ref("product", &raw)
                .ok_or_else(|| AppError::validation("invalid product_id"))?,
        ),
        None => None,
    };

    let entries = state
        .inventory
        .audit()
        .query(
            &farmer,
            InventoryLogFilter {
                product,
                log_type: query.log_type,
                limit: query.limit,
            },
        )
        .await?;

    Ok(ok(entries))
}

// =============================================================================
// Manual adjustment escape hatch
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub product_id: String,
    /// Signed delta: positive replenishes, negative reduces
    pub quantity: i64,
    #[serde(rename = "type")]
    pub log_type: Option<InventoryLogType>,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct AdjustStockResponse {
    pub product: Product,
    pub log: InventoryLogEntry,
}

/// POST /api/inventory-logs - apply a manual stock delta together with its
/// audit entry. Owners adjust their own products; admins may adjust any.
pub async fn adjust(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AdjustStockRequest>,
) -> AppResult<Json<AppResponse<AdjustStockResponse>>> {
    user.require_farmer()?;

    if payload.reason.trim().is_empty() {
        return Err(AppError::validation("reason is required"));
    }

    let product_ref = parse_record_ref("product", &payload.product_id)
        .ok_or_else(|| AppError::validation("invalid product_id"))?;
    let product = state
        .products
        .find_by_id(&product_ref)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", payload.product_id)))?;

    if product.owner != user.id && !user.is_admin() {
        return Err(AppError::forbidden("Product does not belong to you"));
    }

    let (product, log) = state
        .inventory
        .adjust(
            &product_ref,
            &product.owner,
            payload.quantity,
            payload.log_type,
            payload.reason,
        )
        .await?;

    Ok(ok(AdjustStockResponse { product, log }))
}
