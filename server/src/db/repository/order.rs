//! Order Repository

use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{DeliveryStatus, Order, PaymentStatus};

const ORDER_TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create an order under a pre-generated key (best-effort settlement path)
    pub async fn create_with_key(&self, key: &str, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self
            .base
            .db()
            .create((ORDER_TABLE, key))
            .content(order)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    /// All orders placed by a buyer, newest first
    pub async fn find_by_buyer(&self, buyer: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE buyer = $buyer ORDER BY created_at DESC")
            .bind(("buyer", buyer.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// All orders addressed to a farmer, newest first
    pub async fn find_by_farmer(&self, farmer: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE farmer = $farmer ORDER BY created_at DESC")
            .bind(("farmer", farmer.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Overwrite both status fields (cancellation path, best-effort mode)
    pub async fn set_status(
        &self,
        id: &RecordId,
        delivery: DeliveryStatus,
        payment: PaymentStatus,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET delivery_status = $delivery, payment_status = $payment, \
                 updated_at = $at RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("delivery", delivery))
            .bind(("payment", payment))
            .bind(("at", Utc::now()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Farmer-driven delivery transition, guarded against concurrent updates:
    /// the write only lands if the order still belongs to the farmer and is
    /// still in the expected current state. `None` means the guard rejected it.
    pub async fn transition_delivery(
        &self,
        id: &RecordId,
        farmer: &RecordId,
        current: DeliveryStatus,
        next: DeliveryStatus,
    ) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET delivery_status = $next, updated_at = $at \
                 WHERE farmer = $farmer AND delivery_status = $current RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("next", next))
            .bind(("current", current))
            .bind(("farmer", farmer.to_string()))
            .bind(("at", Utc::now()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }
}
