//! Inventory Log Model
//!
//! Append-only audit trail of stock mutations. Entries are created in the
//! same unit of work as the mutation they describe and are never updated
//! or deleted afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Causal reason for a stock mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryLogType {
    /// Manual replenishment by the farmer
    StockAdded,
    /// Manual reduction by the farmer (spoilage, correction)
    StockReduced,
    /// Manual restoration after an out-of-band event
    StockRestored,
    /// Consumption by a settled order
    OrderPlaced,
    /// Restoration by an order cancellation
    OrderCancelled,
}

impl InventoryLogType {
    pub fn as_str(self) -> &'static str {
        match self {
            InventoryLogType::StockAdded => "STOCK_ADDED",
            InventoryLogType::StockReduced => "STOCK_REDUCED",
            InventoryLogType::StockRestored => "STOCK_RESTORED",
            InventoryLogType::OrderPlaced => "ORDER_PLACED",
            InventoryLogType::OrderCancelled => "ORDER_CANCELLED",
        }
    }
}

/// One stock mutation with its before/after snapshot.
///
/// `quantity` is signed: negative for consumption, positive for
/// replenishment or restoration. `new_stock - previous_stock == quantity`
/// holds for every entry; the audit log rejects writes that violate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryLogEntry {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub farmer: RecordId,
    pub log_type: InventoryLogType,
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<RecordId>,
    pub reason: String,
    pub created_at: Option<DateTime<Utc>>,
}
