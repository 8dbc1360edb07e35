//! Unit-of-work executor
//!
//! One reusable primitive runs every settlement workflow: a list of
//! (ledger-delta, audit-entry) operations plus a final aggregate write.
//! Two execution strategies exist, selected once at startup:
//!
//! - **Transactional**: the whole unit is a single multi-statement batch
//!   inside `BEGIN TRANSACTION .. COMMIT TRANSACTION`. Per-item guards are
//!   expressed as `THROW`s, so any failure cancels the entire batch and
//!   nothing becomes visible.
//! - **BestEffort**: steps run one at a time through the stock ledger and
//!   audit log. A mid-unit failure leaves the earlier steps applied; this
//!   degraded mode exists for backends without multi-statement transactions
//!   and its residual risk is deliberate and logged, not hidden.

use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::SettlementError;
use crate::db::models::{
    DeliveryStatus, InventoryLogEntry, InventoryLogType, Order, PaymentStatus,
};
use crate::db::repository::OrderRepository;
use crate::inventory::{AuditLog, StockLedger};

// =============================================================================
// Mode selection
// =============================================================================

/// Execution strategy for settlement units of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomicityMode {
    Transactional,
    BestEffort,
}

impl AtomicityMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AtomicityMode::Transactional => "transactional",
            AtomicityMode::BestEffort => "best-effort",
        }
    }
}

/// Operator preference from configuration; `Auto` probes the store once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AtomicityPreference {
    #[default]
    Auto,
    Transactional,
    BestEffort,
}

impl std::str::FromStr for AtomicityPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(AtomicityPreference::Auto),
            "transactional" => Ok(AtomicityPreference::Transactional),
            "best-effort" | "best_effort" => Ok(AtomicityPreference::BestEffort),
            other => Err(format!("unknown atomicity preference: {other}")),
        }
    }
}

/// Resolve the execution mode once at startup.
///
/// `Auto` runs a single transaction probe against the store; a failed probe
/// drops to best-effort with a warning. The result is fixed for the process
/// lifetime; workflows never re-probe per request.
pub async fn detect_mode(db: &Surreal<Db>, preference: AtomicityPreference) -> AtomicityMode {
    match preference {
        AtomicityPreference::Transactional => AtomicityMode::Transactional,
        AtomicityPreference::BestEffort => {
            tracing::warn!(
                "settlement forced into best-effort mode; partial application \
                 on mid-workflow failure is possible"
            );
            AtomicityMode::BestEffort
        }
        AtomicityPreference::Auto => {
            let supported = match db
                .query("BEGIN TRANSACTION; LET $probe = 1; COMMIT TRANSACTION;")
                .await
            {
                Ok(response) => response.check().is_ok(),
                Err(_) => false,
            };
            if supported {
                AtomicityMode::Transactional
            } else {
                tracing::warn!(
                    "store does not support multi-statement transactions; \
                     settlement falls back to best-effort mode"
                );
                AtomicityMode::BestEffort
            }
        }
    }
}

// =============================================================================
// Unit of work
// =============================================================================

/// One stock mutation and the audit entry describing it
#[derive(Debug, Clone)]
pub struct LedgerOp {
    pub product: RecordId,
    pub farmer: RecordId,
    /// Signed delta: negative consumes, positive restores
    pub delta: i64,
    pub log_type: InventoryLogType,
    pub order: Option<RecordId>,
    pub reason: String,
}

/// The final aggregate write that completes a unit of work
#[derive(Debug, Clone)]
pub enum AggregateWrite {
    CreateOrder { id: RecordId, order: Order },
    SetOrderStatus {
        id: RecordId,
        delivery: DeliveryStatus,
        payment: PaymentStatus,
    },
}

/// Bind shape for the transactional batch
#[derive(Debug, Serialize)]
struct OpBind {
    product: String,
    farmer: String,
    quantity: i64,
    log_type: InventoryLogType,
    order: Option<String>,
    reason: String,
}

impl From<&LedgerOp> for OpBind {
    fn from(op: &LedgerOp) -> Self {
        OpBind {
            product: op.product.to_string(),
            farmer: op.farmer.to_string(),
            quantity: op.delta,
            log_type: op.log_type,
            order: op.order.as_ref().map(|o| o.to_string()),
            reason: op.reason.clone(),
        }
    }
}

/// Per-item body of the transactional batch: re-read the product inside the
/// transaction, guard the invariant with THROWs, decrement, append the log.
const TX_OPS_BLOCK: &str = r#"BEGIN TRANSACTION;
FOR $op IN $ops {
    LET $pid = type::record($op.product);
    LET $prod = (SELECT * FROM $pid)[0];
    IF $prod == NONE { THROW "LEDGER_GONE:" + $op.product };
    IF $prod.stock + $op.quantity < 0 { THROW "LEDGER_SHORT:" + $prod.name };
    UPDATE $pid SET stock += $op.quantity, updated_at = $at;
    CREATE inventory_log CONTENT {
        "product": $op.product,
        "farmer": $op.farmer,
        "log_type": $op.log_type,
        "quantity": $op.quantity,
        "previous_stock": $prod.stock,
        "new_stock": $prod.stock + $op.quantity,
        "order": $op.order,
        "reason": $op.reason,
        "created_at": $at
    };
};
"#;

#[derive(Clone)]
pub struct UnitOfWorkExecutor {
    db: Surreal<Db>,
    mode: AtomicityMode,
    ledger: StockLedger,
    audit: AuditLog,
    orders: OrderRepository,
}

impl UnitOfWorkExecutor {
    pub fn new(db: Surreal<Db>, mode: AtomicityMode) -> Self {
        Self {
            ledger: StockLedger::new(db.clone()),
            audit: AuditLog::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            db,
            mode,
        }
    }

    pub fn mode(&self) -> AtomicityMode {
        self.mode
    }

    /// Run one unit of work: all ledger ops, then the aggregate write.
    /// Succeeds or fails as a whole in transactional mode; in best-effort
    /// mode a failure reports which steps had already been applied.
    pub async fn run(
        &self,
        ops: Vec<LedgerOp>,
        write: AggregateWrite,
    ) -> Result<(), SettlementError> {
        match self.mode {
            AtomicityMode::Transactional => self.run_transactional(&ops, write).await,
            AtomicityMode::BestEffort => self.run_best_effort(&ops, write).await,
        }
    }

    async fn run_transactional(
        &self,
        ops: &[LedgerOp],
        write: AggregateWrite,
    ) -> Result<(), SettlementError> {
        let op_binds: Vec<OpBind> = ops.iter().map(OpBind::from).collect();

        let mut sql = String::from(TX_OPS_BLOCK);
        match &write {
            AggregateWrite::CreateOrder { .. } => {
                sql.push_str("CREATE $agg_id CONTENT $agg;\n");
            }
            AggregateWrite::SetOrderStatus { .. } => {
                sql.push_str(
                    "UPDATE $agg_id SET delivery_status = $delivery, \
                     payment_status = $payment, updated_at = $at;\n",
                );
            }
        }
        sql.push_str("COMMIT TRANSACTION;");

        let mut query = self
            .db
            .query(sql)
            .bind(("ops", op_binds))
            .bind(("at", chrono::Utc::now()));

        match write {
            AggregateWrite::CreateOrder { id, order } => {
                query = query.bind(("agg_id", id)).bind(("agg", order));
            }
            AggregateWrite::SetOrderStatus {
                id,
                delivery,
                payment,
            } => {
                query = query
                    .bind(("agg_id", id))
                    .bind(("delivery", delivery))
                    .bind(("payment", payment));
            }
        }

        let mut response = query.await.map_err(classify_tx_error)?;

        // On THROW the store cancels the whole batch; every statement then
        // carries an error, most of them the generic cancellation notice.
        // Scan all of them so the marker error wins over the noise.
        let errors = response.take_errors();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.into_values().map(|e| e.to_string()).collect();
            let err = messages
                .iter()
                .find_map(|msg| classify_marker(msg))
                .unwrap_or_else(|| {
                    SettlementError::TransactionAbort(
                        messages.into_iter().next().unwrap_or_default(),
                    )
                });
            tracing::warn!(error = %err, "settlement unit of work aborted");
            return Err(err);
        }
        Ok(())
    }

    async fn run_best_effort(
        &self,
        ops: &[LedgerOp],
        write: AggregateWrite,
    ) -> Result<(), SettlementError> {
        for (applied, op) in ops.iter().enumerate() {
            let result = self.apply_one(op).await;
            if let Err(err) = result {
                if applied > 0 {
                    tracing::warn!(
                        applied,
                        total = ops.len(),
                        error = %err,
                        "best-effort settlement failed mid-unit; earlier stock \
                         changes remain applied"
                    );
                }
                return Err(err);
            }
        }

        match write {
            AggregateWrite::CreateOrder { id, order } => {
                let key = id.key().to_string();
                self.orders.create_with_key(&key, order).await?;
            }
            AggregateWrite::SetOrderStatus {
                id,
                delivery,
                payment,
            } => {
                self.orders.set_status(&id, delivery, payment).await?;
            }
        }
        Ok(())
    }

    async fn apply_one(&self, op: &LedgerOp) -> Result<(), SettlementError> {
        let updated = self.ledger.apply_delta(&op.product, op.delta, 0).await?;
        let previous_stock = updated.stock - op.delta;

        self.audit
            .record(InventoryLogEntry {
                id: None,
                product: op.product.clone(),
                farmer: op.farmer.clone(),
                log_type: op.log_type,
                quantity: op.delta,
                previous_stock,
                new_stock: updated.stock,
                order: op.order.clone(),
                reason: op.reason.clone(),
                created_at: None,
            })
            .await?;
        Ok(())
    }
}

/// Map a failed transactional batch back onto the domain taxonomy. The
/// THROW markers inside the batch carry enough context to tell an
/// insufficient-stock rejection from a vanished product; anything else is
/// an infrastructure-level abort.
fn classify_tx_error(err: surrealdb::Error) -> SettlementError {
    let msg = err.to_string();
    classify_marker(&msg).unwrap_or(SettlementError::TransactionAbort(msg))
}

fn classify_marker(msg: &str) -> Option<SettlementError> {
    if let Some(rest) = msg.split("LEDGER_SHORT:").nth(1) {
        let product = marker_payload(rest);
        return Some(SettlementError::InsufficientStock { product });
    }
    if let Some(rest) = msg.split("LEDGER_GONE:").nth(1) {
        let product = marker_payload(rest);
        return Some(SettlementError::ProductNotFound(product));
    }
    None
}

fn marker_payload(rest: &str) -> String {
    rest.trim_end_matches(|c: char| matches!(c, '"' | '\'' | '`' | ')' | '.'))
        .trim()
        .to_string()
}
