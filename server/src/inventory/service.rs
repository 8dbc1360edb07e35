//! Manual inventory adjustments
//!
//! The escape hatch for farmer- or admin-driven stock corrections: a ledger
//! delta and its audit entry applied together, without going through the
//! order settlement coordinator.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{AuditLog, InventoryError, InventoryResult, StockLedger};
use crate::db::models::{InventoryLogEntry, InventoryLogType, Product};

#[derive(Clone)]
pub struct InventoryService {
    ledger: StockLedger,
    audit: AuditLog,
}

impl InventoryService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            ledger: StockLedger::new(db.clone()),
            audit: AuditLog::new(db),
        }
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Apply a manual stock delta and append the matching audit entry.
    ///
    /// `log_type` defaults from the delta sign (STOCK_ADDED / STOCK_REDUCED);
    /// STOCK_RESTORED may be passed explicitly for positive deltas. The
    /// order-driven types are reserved for the settlement coordinator.
    pub async fn adjust(
        &self,
        product: &RecordId,
        farmer: &RecordId,
        delta: i64,
        log_type: Option<InventoryLogType>,
        reason: String,
    ) -> InventoryResult<(Product, InventoryLogEntry)> {
        let log_type = match log_type {
            None if delta > 0 => InventoryLogType::StockAdded,
            None => InventoryLogType::StockReduced,
            Some(InventoryLogType::StockAdded) | Some(InventoryLogType::StockRestored)
                if delta < 0 =>
            {
                return Err(InventoryError::InvalidDelta(
                    "additive log type requires a positive delta".into(),
                ));
            }
            Some(InventoryLogType::StockReduced) if delta > 0 => {
                return Err(InventoryError::InvalidDelta(
                    "STOCK_REDUCED requires a negative delta".into(),
                ));
            }
            Some(InventoryLogType::OrderPlaced) | Some(InventoryLogType::OrderCancelled) => {
                return Err(InventoryError::InvalidDelta(
                    "order log types are written by order settlement only".into(),
                ));
            }
            Some(t) => t,
        };

        let updated = self.ledger.apply_delta(product, delta, 0).await?;
        let previous_stock = updated.stock - delta;

        let entry = self
            .audit
            .record(InventoryLogEntry {
                id: None,
                product: product.clone(),
                farmer: farmer.clone(),
                log_type,
                quantity: delta,
                previous_stock,
                new_stock: updated.stock,
                order: None,
                reason,
                created_at: None,
            })
            .await?;

        Ok((updated, entry))
    }

    /// Record the opening stock of a freshly created product
    pub async fn record_opening_stock(
        &self,
        product: &Product,
    ) -> InventoryResult<Option<InventoryLogEntry>> {
        if product.stock == 0 {
            return Ok(None);
        }
        let Some(ref id) = product.id else {
            return Err(InventoryError::Storage("product has no id".into()));
        };

        let entry = self
            .audit
            .record(InventoryLogEntry {
                id: None,
                product: id.clone(),
                farmer: product.owner.clone(),
                log_type: InventoryLogType::StockAdded,
                quantity: product.stock,
                previous_stock: 0,
                new_stock: product.stock,
                order: None,
                reason: format!("Initial stock for {}", product.name),
                created_at: None,
            })
            .await?;
        Ok(Some(entry))
    }
}
