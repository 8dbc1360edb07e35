//! Order Model
//!
//! One order = one buyer, one farmer. Line items capture the unit price that
//! was current at settlement time, so `total_price` stays explainable after
//! later catalog edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use super::serde_helpers;

// =============================================================================
// Status enums
// =============================================================================

/// Payment lifecycle: pending -> completed (online) or pending -> failed.
/// Cancellation force-sets `failed` regardless of prior value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Delivery lifecycle: pending -> shipped -> delivered, forward-only.
/// `cancelled` is terminal and only reachable from `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    /// Forward-only transition table for farmer-driven updates.
    /// Cancellation is not part of this table; it goes through the
    /// settlement coordinator's cancel workflow.
    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        matches!(
            (self, next),
            (DeliveryStatus::Pending, DeliveryStatus::Shipped)
                | (DeliveryStatus::Shipped, DeliveryStatus::Delivered)
        )
    }

    /// An order can be cancelled by its buyer only while still pending
    pub fn is_cancellable(self) -> bool {
        matches!(self, DeliveryStatus::Pending)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Shipped => "shipped",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Online,
    Cod,
}

// =============================================================================
// Embedded values
// =============================================================================

/// Delivery address snapshot, copied into the order at settlement time.
/// Later edits to a user's saved address never alter past orders.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeliveryAddress {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "district is required"))]
    pub district: String,
    #[validate(length(min = 1, message = "state is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "pincode is required"))]
    pub pincode: String,
}

/// One order line: product reference, quantity, and the unit price captured
/// from the authoritative product record at settlement time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub quantity: i64,
    pub unit_price: f64,
}

// =============================================================================
// Order
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub buyer: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub farmer: RecordId,
    pub lines: Vec<OrderLine>,
    pub total_price: f64,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub payment_method: PaymentMethod,
    pub delivery_address: DeliveryAddress,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
