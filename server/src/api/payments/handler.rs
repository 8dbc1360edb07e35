//! Payment API handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{DeliveryAddress, Order};
use crate::payment::PaymentIntent;
use crate::settlement::{CartLine, PaymentAssertion};
use crate::utils::{ok, ok_with_message, AppResponse, AppResult};

// =============================================================================
// Charge intent (precursor to Workflow B)
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub cart: Vec<CartLine>,
}

/// Create a payment intent with the gateway for the cart's authoritative
/// total. The client-side checkout drives the gateway from here.
pub async fn create_intent(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateIntentRequest>,
) -> AppResult<Json<AppResponse<PaymentIntent>>> {
    let (amount, amount_minor) = state.coordinator.quote_cart(&payload.cart).await?;

    let receipt = format!("receipt_{}", chrono::Utc::now().timestamp_millis());
    let intent = state
        .gateway
        .create_order(
            amount,
            amount_minor,
            receipt,
            user.id.to_string(),
            payload.cart.len(),
        )
        .await?;

    Ok(ok(intent))
}

// =============================================================================
// Verified placement (Workflow B)
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct VerifyAndPlaceRequest {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
    pub cart: Vec<CartLine>,
    pub delivery_address: DeliveryAddress,
}

#[derive(Debug, Serialize)]
pub struct VerifiedOrderResponse {
    pub order_id: String,
    pub order: Order,
}

/// Verify the gateway's payment assertion, then settle the order. A
/// rejected signature never reaches any stock mutation.
pub async fn verify_and_place(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<VerifyAndPlaceRequest>,
) -> AppResult<Json<AppResponse<VerifiedOrderResponse>>> {
    let assertion = PaymentAssertion {
        gateway_order_id: payload.gateway_order_id,
        gateway_payment_id: payload.gateway_payment_id,
        signature: payload.signature,
    };

    let order = state
        .coordinator
        .place_paid_order(&user.id, &payload.cart, payload.delivery_address, assertion)
        .await?;

    let order_id = order
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();
    Ok(ok_with_message(
        VerifiedOrderResponse { order_id, order },
        "Payment verified and order created successfully",
    ))
}
