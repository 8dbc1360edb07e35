//! Order API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use crate::auth::{CurrentUser, Role};
use crate::core::ServerState;
use crate::db::models::{DeliveryAddress, DeliveryStatus, Order};
use crate::db::repository::parse_record_ref;
use crate::settlement::CartLine;
use crate::utils::{ok, ok_with_message, AppError, AppResponse, AppResult};

const ORDER_TABLE: &str = "order";

fn parse_order_ref(raw: &str) -> Result<RecordId, AppError> {
    parse_record_ref(ORDER_TABLE, raw)
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", raw)))
}

// =============================================================================
// Placement (Workflow A)
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaceCodRequest {
    pub cart: Vec<CartLine>,
    pub delivery_address: DeliveryAddress,
}

#[derive(Debug, Serialize)]
pub struct OrderPlacedResponse {
    pub order_id: String,
}

/// Place a cash-on-delivery order
pub async fn place_cod(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PlaceCodRequest>,
) -> AppResult<Json<AppResponse<OrderPlacedResponse>>> {
    let order = state
        .coordinator
        .place_cod_order(&user.id, &payload.cart, payload.delivery_address)
        .await?;

    let order_id = order.id.map(|id| id.to_string()).unwrap_or_default();
    Ok(ok_with_message(
        OrderPlacedResponse { order_id },
        "COD order placed successfully",
    ))
}

// =============================================================================
// Cancellation (Workflow C)
// =============================================================================

/// Cancel an order and restore its stock
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order_id = parse_order_ref(&id)?;
    let order = state.coordinator.cancel_order(&user.id, &order_id).await?;
    Ok(ok_with_message(
        order,
        "Order cancelled successfully and stock restored",
    ))
}

// =============================================================================
// Delivery transitions (farmer)
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub delivery_status: DeliveryStatus,
}

/// Move an order forward through the delivery lifecycle
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    user.require_farmer()?;

    let order_id = parse_order_ref(&id)?;
    let order = state
        .orders
        .find_by_id(&order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

    if order.farmer != user.id && !user.is_admin() {
        return Err(AppError::forbidden("Order does not belong to you"));
    }

    let current = order.delivery_status;
    let next = payload.delivery_status;
    if !current.can_transition_to(next) {
        return Err(AppError::BusinessRule(format!(
            "Cannot move delivery status from {} to {}",
            current.as_str(),
            next.as_str()
        )));
    }

    let updated = state
        .orders
        .transition_delivery(&order_id, &order.farmer, current, next)
        .await?
        .ok_or_else(|| {
            // Guard rejected the write: the order changed under us
            AppError::BusinessRule("Order state changed concurrently, retry".into())
        })?;

    Ok(ok_with_message(
        updated,
        format!("Order status updated to {}", next.as_str()),
    ))
}

// =============================================================================
// Reads
// =============================================================================

/// List the caller's orders: farmers see incoming orders, buyers their own
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<Order>>>> {
    let orders = match user.role {
        Role::Farmer => state.orders.find_by_farmer(&user.id).await?,
        _ => state.orders.find_by_buyer(&user.id).await?,
    };
    Ok(ok(orders))
}

/// Fetch one order; only its buyer or farmer may look
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order_id = parse_order_ref(&id)?;
    let order = state
        .orders
        .find_by_id(&order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

    if order.buyer != user.id && order.farmer != user.id && !user.is_admin() {
        return Err(AppError::forbidden("Not allowed to view this order"));
    }

    Ok(ok(order))
}
