//! Settlement Coordinator
//!
//! Orchestrates the three order workflows as single units of work:
//!
//! - COD placement: validate, derive the single farmer, capture prices,
//!   decrement stock per line with an audit entry each, create the order.
//! - Online-paid placement: the same, but only after the payment
//!   verification gate accepts the gateway's assertion.
//! - Cancellation: restore stock per line with an audit entry each, then
//!   move the order to its terminal cancelled state.
//!
//! Carts arrive as bare (product, quantity) pairs. Price and ownership are
//! always re-read from the product records at settlement time; a client
//! can display whatever it likes, it cannot set what it pays.

use std::collections::HashMap;

use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;
use validator::Validate;

use super::executor::{AggregateWrite, AtomicityMode, LedgerOp, UnitOfWorkExecutor};
use super::{money, SettlementError};
use crate::db::models::{
    DeliveryAddress, DeliveryStatus, InventoryLogType, Order, OrderLine, PaymentMethod,
    PaymentStatus, Product,
};
use crate::db::repository::{OrderRepository, ProductRepository};
use crate::payment::SignatureVerifier;

const PRODUCT_TABLE: &str = "product";
const ORDER_TABLE: &str = "order";

/// One client-submitted cart line. Quantity only; everything else is
/// re-read server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// The gateway's claim that a payment went through
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentAssertion {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

#[derive(Clone)]
pub struct SettlementCoordinator {
    executor: UnitOfWorkExecutor,
    products: ProductRepository,
    orders: OrderRepository,
    verifier: SignatureVerifier,
}

impl SettlementCoordinator {
    pub fn new(db: Surreal<Db>, mode: AtomicityMode, verifier: SignatureVerifier) -> Self {
        Self {
            executor: UnitOfWorkExecutor::new(db.clone(), mode),
            products: ProductRepository::new(db.clone()),
            orders: OrderRepository::new(db),
            verifier,
        }
    }

    pub fn atomicity(&self) -> AtomicityMode {
        self.executor.mode()
    }

    // =========================================================================
    // Workflow A - cash on delivery
    // =========================================================================

    pub async fn place_cod_order(
        &self,
        buyer: &RecordId,
        cart: &[CartLine],
        address: DeliveryAddress,
    ) -> Result<Order, SettlementError> {
        self.place(buyer, cart, address, PaymentMethod::Cod, None)
            .await
    }

    // =========================================================================
    // Workflow B - online payment, behind the verification gate
    // =========================================================================

    pub async fn place_paid_order(
        &self,
        buyer: &RecordId,
        cart: &[CartLine],
        address: DeliveryAddress,
        assertion: PaymentAssertion,
    ) -> Result<Order, SettlementError> {
        // Gate first: a forged assertion must never reach any stock mutation
        if !self.verifier.verify(
            &assertion.gateway_order_id,
            &assertion.gateway_payment_id,
            &assertion.signature,
        ) {
            return Err(SettlementError::PaymentRejected);
        }

        self.place(buyer, cart, address, PaymentMethod::Online, Some(assertion))
            .await
    }

    // =========================================================================
    // Workflow C - cancellation with stock restore
    // =========================================================================

    pub async fn cancel_order(
        &self,
        caller: &RecordId,
        order_id: &RecordId,
    ) -> Result<Order, SettlementError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| SettlementError::OrderNotFound(order_id.to_string()))?;

        if order.buyer != *caller {
            return Err(SettlementError::NotOwner);
        }
        match order.delivery_status {
            DeliveryStatus::Cancelled => return Err(SettlementError::AlreadyCancelled),
            DeliveryStatus::Shipped | DeliveryStatus::Delivered => {
                return Err(SettlementError::NotCancellable)
            }
            DeliveryStatus::Pending => {}
        }

        let reason = format!("Order cancelled by customer. Order ID: {}", order_id);
        let ops: Vec<LedgerOp> = order
            .lines
            .iter()
            .map(|line| LedgerOp {
                product: line.product.clone(),
                farmer: order.farmer.clone(),
                delta: line.quantity,
                log_type: InventoryLogType::OrderCancelled,
                order: Some(order_id.clone()),
                reason: reason.clone(),
            })
            .collect();

        self.executor
            .run(
                ops,
                AggregateWrite::SetOrderStatus {
                    id: order_id.clone(),
                    delivery: DeliveryStatus::Cancelled,
                    payment: PaymentStatus::Failed,
                },
            )
            .await?;

        self.fetch_settled(order_id).await
    }

    // =========================================================================
    // Cart quoting (payment-intent precursor to Workflow B)
    // =========================================================================

    /// Price a cart from the authoritative product records. Returns the
    /// total in major and minor units for the payment gateway.
    pub async fn quote_cart(&self, cart: &[CartLine]) -> Result<(f64, i64), SettlementError> {
        if cart.is_empty() {
            return Err(SettlementError::EmptyCart);
        }

        let refs: Vec<RecordId> = cart
            .iter()
            .map(|line| parse_product_ref(&line.product_id))
            .collect::<Result<_, _>>()?;
        let loaded = self.products.find_by_ids(&refs).await?;
        let by_ref: HashMap<String, Product> = loaded
            .into_iter()
            .filter_map(|p| p.id.as_ref().map(|id| (id.to_string(), p.clone())))
            .collect();

        let mut priced = Vec::with_capacity(cart.len());
        for (line, product_ref) in cart.iter().zip(&refs) {
            let product = by_ref
                .get(&product_ref.to_string())
                .ok_or_else(|| SettlementError::ProductNotFound(line.product_id.clone()))?;
            if line.quantity <= 0 {
                return Err(SettlementError::InvalidQuantity {
                    product: product.name.clone(),
                });
            }
            priced.push((product.price, line.quantity));
        }

        let total = money::cart_total(priced);
        Ok((money::to_f64(total), money::to_minor_units(total)))
    }

    // =========================================================================
    // Shared placement path
    // =========================================================================

    async fn place(
        &self,
        buyer: &RecordId,
        cart: &[CartLine],
        address: DeliveryAddress,
        method: PaymentMethod,
        assertion: Option<PaymentAssertion>,
    ) -> Result<Order, SettlementError> {
        if cart.is_empty() {
            return Err(SettlementError::EmptyCart);
        }
        if address.validate().is_err() {
            return Err(SettlementError::IncompleteAddress);
        }

        // Authoritative read of every product in the cart
        let refs: Vec<RecordId> = cart
            .iter()
            .map(|line| parse_product_ref(&line.product_id))
            .collect::<Result<_, _>>()?;
        let loaded = self.products.find_by_ids(&refs).await?;
        let by_ref: HashMap<String, Product> = loaded
            .into_iter()
            .filter_map(|p| p.id.as_ref().map(|id| (id.to_string(), p.clone())))
            .collect();

        let mut farmer: Option<RecordId> = None;
        let mut lines = Vec::with_capacity(cart.len());
        for (line, product_ref) in cart.iter().zip(&refs) {
            let product = by_ref
                .get(&product_ref.to_string())
                .ok_or_else(|| SettlementError::ProductNotFound(line.product_id.clone()))?;

            if line.quantity <= 0 {
                return Err(SettlementError::InvalidQuantity {
                    product: product.name.clone(),
                });
            }
            // Fast feasibility check; the unit of work re-checks atomically
            if product.stock < line.quantity {
                return Err(SettlementError::InsufficientStock {
                    product: product.name.clone(),
                });
            }

            // One order = one farmer
            match &farmer {
                None => farmer = Some(product.owner.clone()),
                Some(owner) if *owner == product.owner => {}
                Some(_) => return Err(SettlementError::MultipleFarmers),
            }

            lines.push(OrderLine {
                product: product_ref.clone(),
                quantity: line.quantity,
                unit_price: product.price,
            });
        }
        let Some(farmer) = farmer else {
            return Err(SettlementError::EmptyCart);
        };

        let total =
            money::cart_total(lines.iter().map(|line| (line.unit_price, line.quantity)));

        let order_id =
            RecordId::from_table_key(ORDER_TABLE, Uuid::new_v4().simple().to_string());
        let reason = match method {
            PaymentMethod::Cod => format!("Order placed (COD) - Order ID: {}", order_id),
            PaymentMethod::Online => {
                format!("Order placed by customer. Order ID: {}", order_id)
            }
        };

        let ops: Vec<LedgerOp> = lines
            .iter()
            .map(|line| LedgerOp {
                product: line.product.clone(),
                farmer: farmer.clone(),
                delta: -line.quantity,
                log_type: InventoryLogType::OrderPlaced,
                order: Some(order_id.clone()),
                reason: reason.clone(),
            })
            .collect();

        let now = chrono::Utc::now();
        let order = Order {
            id: None,
            buyer: buyer.clone(),
            farmer,
            lines,
            total_price: money::to_f64(total),
            payment_status: match method {
                PaymentMethod::Cod => PaymentStatus::Pending,
                PaymentMethod::Online => PaymentStatus::Completed,
            },
            delivery_status: DeliveryStatus::Pending,
            payment_method: method,
            delivery_address: address,
            gateway_order_id: assertion.as_ref().map(|a| a.gateway_order_id.clone()),
            gateway_payment_id: assertion.as_ref().map(|a| a.gateway_payment_id.clone()),
            gateway_signature: assertion.as_ref().map(|a| a.signature.clone()),
            created_at: Some(now),
            updated_at: Some(now),
        };

        self.executor
            .run(
                ops,
                AggregateWrite::CreateOrder {
                    id: order_id.clone(),
                    order,
                },
            )
            .await?;

        self.fetch_settled(&order_id).await
    }

    async fn fetch_settled(&self, order_id: &RecordId) -> Result<Order, SettlementError> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| {
                SettlementError::Storage(format!("order {} missing after settlement", order_id))
            })
    }
}

/// Accept both `"product:abc"` and bare `"abc"` product references
fn parse_product_ref(raw: &str) -> Result<RecordId, SettlementError> {
    crate::db::repository::parse_record_ref(PRODUCT_TABLE, raw)
        .ok_or_else(|| SettlementError::ProductNotFound(raw.to_string()))
}
