//! Inventory Audit Log
//!
//! Append-only record of every stock mutation. Each entry carries the
//! before/after snapshot and the causal reason; the arithmetic invariant
//! `new_stock = previous_stock + quantity` is checked before every insert.

use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{InventoryError, InventoryResult};
use crate::db::models::InventoryLogEntry;
use crate::db::repository::inventory_log::InventoryLogFilter;
use crate::db::repository::InventoryLogRepository;

#[derive(Clone)]
pub struct AuditLog {
    repo: InventoryLogRepository,
}

impl AuditLog {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            repo: InventoryLogRepository::new(db),
        }
    }

    /// Append one entry.
    ///
    /// A violated arithmetic invariant means the caller computed its
    /// snapshot wrong; that is a bug, so it surfaces as a fatal
    /// consistency error instead of being silently corrected.
    pub async fn record(&self, mut entry: InventoryLogEntry) -> InventoryResult<InventoryLogEntry> {
        if entry.new_stock != entry.previous_stock + entry.quantity {
            return Err(InventoryError::Consistency(format!(
                "log entry for {} claims {} -> {} with delta {}",
                entry.product, entry.previous_stock, entry.new_stock, entry.quantity
            )));
        }
        if entry.created_at.is_none() {
            entry.created_at = Some(Utc::now());
        }

        Ok(self.repo.insert(entry).await?)
    }

    /// Audit read surface: entries for one farmer, newest first
    pub async fn query(
        &self,
        farmer: &RecordId,
        filter: InventoryLogFilter,
    ) -> InventoryResult<Vec<InventoryLogEntry>> {
        Ok(self.repo.find_for_farmer(farmer, filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::models::InventoryLogType;

    fn entry(previous: i64, quantity: i64, new: i64) -> InventoryLogEntry {
        InventoryLogEntry {
            id: None,
            product: RecordId::from_table_key("product", "p1"),
            farmer: RecordId::from_table_key("user", "f1"),
            log_type: InventoryLogType::OrderPlaced,
            quantity,
            previous_stock: previous,
            new_stock: new,
            order: Some(RecordId::from_table_key("order", "o1")),
            reason: "Order placed by customer. Order ID: order:o1".into(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn record_rejects_broken_arithmetic() {
        let audit = AuditLog::new(db::memory().await);

        let err = audit.record(entry(10, -3, 8)).await.unwrap_err();
        assert!(matches!(err, InventoryError::Consistency(_)));
    }

    #[tokio::test]
    async fn record_roundtrips_through_query() {
        let audit = AuditLog::new(db::memory().await);
        let farmer = RecordId::from_table_key("user", "f1");

        let written = audit.record(entry(10, -3, 7)).await.unwrap();
        assert_eq!(written.previous_stock, 10);
        assert_eq!(written.new_stock, 7);
        assert!(written.created_at.is_some());

        let found = audit
            .query(
                &farmer,
                InventoryLogFilter {
                    product: Some(RecordId::from_table_key("product", "p1")),
                    log_type: None,
                    limit: 50,
                },
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].previous_stock, 10);
        assert_eq!(found[0].new_stock, 7);
        assert_eq!(found[0].quantity, -3);
    }

    #[tokio::test]
    async fn query_filters_by_type_and_caps_results() {
        let audit = AuditLog::new(db::memory().await);
        let farmer = RecordId::from_table_key("user", "f1");

        audit.record(entry(10, -3, 7)).await.unwrap();
        let mut restock = entry(7, 5, 12);
        restock.log_type = InventoryLogType::StockAdded;
        restock.order = None;
        audit.record(restock).await.unwrap();

        let placed = audit
            .query(
                &farmer,
                InventoryLogFilter {
                    product: None,
                    log_type: Some(InventoryLogType::OrderPlaced),
                    limit: 50,
                },
            )
            .await
            .unwrap();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].log_type, InventoryLogType::OrderPlaced);

        let capped = audit
            .query(
                &farmer,
                InventoryLogFilter {
                    product: None,
                    log_type: None,
                    limit: 1,
                },
            )
            .await
            .unwrap();
        assert_eq!(capped.len(), 1);
    }
}
