//! Product Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Sale unit for produce listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Liters,
    Pieces,
    Bundles,
    Grams,
}

impl Default for Unit {
    fn default() -> Self {
        Unit::Kg
    }
}

fn default_low_stock_threshold() -> i64 {
    10
}

/// Product listing owned by a farmer
///
/// `stock` is only ever mutated through the stock ledger's conditional
/// apply-delta update; nothing else writes this field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Record link to the owning farmer (user table)
    #[serde(with = "serde_helpers::record_id")]
    pub owner: RecordId,
    pub name: String,
    pub description: String,
    /// Unit price, always positive
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
    pub category: String,
    /// Available units, never negative
    pub stock: i64,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub is_organic: bool,
    pub harvest_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }
}

/// Create payload for a new product listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub category: String,
    /// Opening stock, recorded as STOCK_ADDED in the audit log
    pub stock: i64,
    pub unit: Option<Unit>,
    pub is_organic: Option<bool>,
    pub harvest_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub low_stock_threshold: Option<i64>,
}

/// Update payload for a product listing
///
/// Deliberately carries no `stock` field: stock corrections go through the
/// inventory adjustment endpoint so every change lands in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub unit: Option<Unit>,
    pub is_organic: Option<bool>,
    pub harvest_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub low_stock_threshold: Option<i64>,
}
