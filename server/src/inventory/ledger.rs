//! Stock Ledger
//!
//! Owns the per-product stock counter. The only write path is
//! [`StockLedger::apply_delta`], a single conditional update executed
//! atomically by the store: the stock check and the write cannot be
//! interleaved by a concurrent request, so two simultaneous consumptions
//! can never combine into negative stock.

use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{InventoryError, InventoryResult};
use crate::db::models::Product;

#[derive(Clone)]
pub struct StockLedger {
    db: Surreal<Db>,
}

impl StockLedger {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Apply a signed delta to a product's stock.
    ///
    /// Negative deltas consume, positive deltas restore or replenish.
    /// The write only lands when `stock + delta >= expected_minimum`
    /// (0 for consumption). A rejected write means concurrently-updated
    /// stock no longer satisfies the guard; the caller must fail its whole
    /// workflow, never partially apply.
    pub async fn apply_delta(
        &self,
        product: &RecordId,
        delta: i64,
        expected_minimum: i64,
    ) -> InventoryResult<Product> {
        if delta == 0 {
            return Err(InventoryError::InvalidDelta("delta cannot be zero".into()));
        }

        let mut result = self
            .db
            .query(
                "UPDATE $prod SET stock += $delta, updated_at = $at \
                 WHERE stock + $delta >= $min RETURN AFTER",
            )
            .bind(("prod", product.clone()))
            .bind(("delta", delta))
            .bind(("min", expected_minimum))
            .bind(("at", Utc::now()))
            .await?;
        let updated: Vec<Product> = result.take(0)?;

        match updated.into_iter().next() {
            Some(product) => Ok(product),
            None => {
                // Empty result: either the product is gone or the guard
                // rejected the write. Disambiguate with a plain read.
                let existing: Option<Product> = self.db.select(product.clone()).await?;
                match existing {
                    Some(p) => Err(InventoryError::InsufficientStock { product: p.name }),
                    None => Err(InventoryError::NotFound(format!(
                        "Product {} not found",
                        product
                    ))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::db::models::{Product, Unit};

    async fn seed_product(db: &Surreal<Db>, name: &str, stock: i64) -> RecordId {
        let product = Product {
            id: None,
            owner: RecordId::from_table_key("user", "farmer1"),
            name: name.to_string(),
            description: "test produce".into(),
            price: 40.0,
            image_url: String::new(),
            category: "vegetables".into(),
            stock,
            unit: Unit::Kg,
            is_organic: false,
            harvest_date: None,
            expiry_date: None,
            low_stock_threshold: 10,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        };
        let created: Option<Product> = db.create("product").content(product).await.unwrap();
        created.unwrap().id.unwrap()
    }

    #[tokio::test]
    async fn consumption_decrements_stock() {
        let db = db::memory().await;
        let id = seed_product(&db, "Tomato", 10).await;
        let ledger = StockLedger::new(db);

        let updated = ledger.apply_delta(&id, -3, 0).await.unwrap();
        assert_eq!(updated.stock, 7);
    }

    #[tokio::test]
    async fn consumption_cannot_drive_stock_negative() {
        let db = db::memory().await;
        let id = seed_product(&db, "Tomato", 2).await;
        let ledger = StockLedger::new(db.clone());

        let err = ledger.apply_delta(&id, -3, 0).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::InsufficientStock { ref product } if product == "Tomato"
        ));

        // Stock unchanged after the rejected write
        let product: Option<Product> = db.select(id).await.unwrap();
        assert_eq!(product.unwrap().stock, 2);
    }

    #[tokio::test]
    async fn restoration_always_succeeds_on_existing_product() {
        let db = db::memory().await;
        let id = seed_product(&db, "Tomato", 0).await;
        let ledger = StockLedger::new(db);

        let updated = ledger.apply_delta(&id, 5, 0).await.unwrap();
        assert_eq!(updated.stock, 5);
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let db = db::memory().await;
        let ledger = StockLedger::new(db);
        let ghost = RecordId::from_table_key("product", "nope");

        let err = ledger.apply_delta(&ghost, -1, 0).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn zero_delta_is_rejected() {
        let db = db::memory().await;
        let id = seed_product(&db, "Tomato", 5).await;
        let ledger = StockLedger::new(db);

        let err = ledger.apply_delta(&id, 0, 0).await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidDelta(_)));
    }

    #[tokio::test]
    async fn concurrent_consumers_cannot_both_win() {
        let db = db::memory().await;
        let id = seed_product(&db, "Tomato", 5).await;
        let ledger_a = StockLedger::new(db.clone());
        let ledger_b = StockLedger::new(db.clone());

        let (a, b) = tokio::join!(
            ledger_a.apply_delta(&id, -3, 0),
            ledger_b.apply_delta(&id, -3, 0)
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one of two competing orders may win");

        let product: Option<Product> = db.select(id).await.unwrap();
        assert_eq!(product.unwrap().stock, 2);
    }
}
