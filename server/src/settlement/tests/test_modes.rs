//! Atomicity modes: transactional batches, best-effort fallback, and the
//! one real concurrency hazard (two buyers racing for the same stock)

use super::*;
use crate::db::models::InventoryLogEntry;

fn placement_op(
    product: &RecordId,
    delta: i64,
    order_id: &RecordId,
) -> LedgerOp {
    LedgerOp {
        product: product.clone(),
        farmer: RecordId::from_table_key("user", "farmer1"),
        delta,
        log_type: InventoryLogType::OrderPlaced,
        order: Some(order_id.clone()),
        reason: format!("Order placed (COD) - Order ID: {}", order_id),
    }
}

fn draft_order(lines: Vec<(RecordId, i64, f64)>) -> Order {
    let now = chrono::Utc::now();
    Order {
        id: None,
        buyer: buyer(),
        farmer: RecordId::from_table_key("user", "farmer1"),
        lines: lines
            .into_iter()
            .map(|(product, quantity, unit_price)| crate::db::models::order::OrderLine {
                product,
                quantity,
                unit_price,
            })
            .collect(),
        total_price: 0.0,
        payment_status: PaymentStatus::Pending,
        delivery_status: DeliveryStatus::Pending,
        payment_method: PaymentMethod::Cod,
        delivery_address: address(),
        gateway_order_id: None,
        gateway_payment_id: None,
        gateway_signature: None,
        created_at: Some(now),
        updated_at: Some(now),
    }
}

#[tokio::test]
async fn auto_preference_probes_to_transactional_on_capable_store() {
    let db = db::memory().await;
    let mode = detect_mode(&db, AtomicityPreference::Auto).await;
    assert_eq!(mode, AtomicityMode::Transactional);
}

#[tokio::test]
async fn explicit_preference_wins_over_probing() {
    let db = db::memory().await;
    let mode = detect_mode(&db, AtomicityPreference::BestEffort).await;
    assert_eq!(mode, AtomicityMode::BestEffort);
}

#[test]
fn preference_parses_from_config_strings() {
    use std::str::FromStr;
    assert_eq!(
        AtomicityPreference::from_str("auto").unwrap(),
        AtomicityPreference::Auto
    );
    assert_eq!(
        AtomicityPreference::from_str("transactional").unwrap(),
        AtomicityPreference::Transactional
    );
    assert_eq!(
        AtomicityPreference::from_str("best-effort").unwrap(),
        AtomicityPreference::BestEffort
    );
    assert!(AtomicityPreference::from_str("yolo").is_err());
}

#[tokio::test]
async fn transactional_guard_rejects_and_leaves_no_residue() {
    let db = db::memory().await;
    let tomato = seed_product(&db, "Tomato", "farmer1", 40.0, 5).await;
    let spinach = seed_product(&db, "Spinach", "farmer1", 25.0, 1).await;
    let executor = UnitOfWorkExecutor::new(db.clone(), AtomicityMode::Transactional);

    let order_id = RecordId::from_table_key("order", "tx1");
    let ops = vec![
        placement_op(&tomato, -3, &order_id),
        placement_op(&spinach, -2, &order_id),
    ];
    let write = AggregateWrite::CreateOrder {
        id: order_id,
        order: draft_order(vec![(tomato.clone(), 3, 40.0), (spinach.clone(), 2, 25.0)]),
    };

    let err = executor.run(ops, write).await.unwrap_err();
    assert!(matches!(
        err,
        SettlementError::InsufficientStock { ref product } if product == "Spinach"
    ));

    // The whole batch rolled back: the first decrement is gone too
    assert_eq!(stock_of(&db, &tomato).await, 5);
    assert_eq!(stock_of(&db, &spinach).await, 1);
    assert!(all_logs(&db).await.is_empty());
    assert!(all_orders(&db).await.is_empty());
}

#[tokio::test]
async fn transactional_batch_reports_vanished_products() {
    let db = db::memory().await;
    let executor = UnitOfWorkExecutor::new(db.clone(), AtomicityMode::Transactional);

    let ghost = RecordId::from_table_key("product", "ghost");
    let order_id = RecordId::from_table_key("order", "tx2");
    let ops = vec![placement_op(&ghost, -1, &order_id)];
    let write = AggregateWrite::CreateOrder {
        id: order_id,
        order: draft_order(vec![(ghost.clone(), 1, 1.0)]),
    };

    let err = executor.run(ops, write).await.unwrap_err();
    assert!(matches!(err, SettlementError::ProductNotFound(_)));
}

#[tokio::test]
async fn best_effort_settles_the_happy_path() {
    let (db, coordinator) = coordinator(AtomicityMode::BestEffort).await;
    let tomato = seed_product(&db, "Tomato", "farmer1", 40.0, 10).await;

    let order = coordinator
        .place_cod_order(&buyer(), &[line(&tomato, 3)], address())
        .await
        .unwrap();

    assert_eq!(order.total_price, 120.0);
    assert_eq!(stock_of(&db, &tomato).await, 7);
    assert_eq!(all_logs(&db).await.len(), 1);
}

#[tokio::test]
async fn best_effort_failure_can_leave_partial_application() {
    let db = db::memory().await;
    let tomato = seed_product(&db, "Tomato", "farmer1", 40.0, 5).await;
    let spinach = seed_product(&db, "Spinach", "farmer1", 25.0, 1).await;
    let executor = UnitOfWorkExecutor::new(db.clone(), AtomicityMode::BestEffort);

    let order_id = RecordId::from_table_key("order", "be1");
    let ops = vec![
        placement_op(&tomato, -3, &order_id),
        placement_op(&spinach, -2, &order_id),
    ];
    let write = AggregateWrite::CreateOrder {
        id: order_id,
        order: draft_order(vec![(tomato.clone(), 3, 40.0), (spinach.clone(), 2, 25.0)]),
    };

    let err = executor.run(ops, write).await.unwrap_err();
    assert!(matches!(err, SettlementError::InsufficientStock { .. }));

    // Degraded mode: the first decrement stays applied, the order does not
    // exist. This residue is the documented cost of a store without
    // multi-statement transactions.
    assert_eq!(stock_of(&db, &tomato).await, 2);
    assert_eq!(stock_of(&db, &spinach).await, 1);
    let logs: Vec<InventoryLogEntry> = all_logs(&db).await;
    assert_eq!(logs.len(), 1);
    assert!(all_orders(&db).await.is_empty());
}

#[tokio::test]
async fn racing_buyers_cannot_oversell_best_effort() {
    let (db, coordinator) = coordinator(AtomicityMode::BestEffort).await;
    let tomato = seed_product(&db, "Tomato", "farmer1", 40.0, 5).await;

    let buyer_a = RecordId::from_table_key("user", "buyer-a");
    let buyer_b = RecordId::from_table_key("user", "buyer-b");
    let lines_a = [line(&tomato, 3)];
    let lines_b = [line(&tomato, 3)];
    let (a, b) = tokio::join!(
        coordinator.place_cod_order(&buyer_a, &lines_a, address()),
        coordinator.place_cod_order(&buyer_b, &lines_b, address())
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one of two competing orders may win");
    assert_eq!(stock_of(&db, &tomato).await, 2);

    let placed = all_logs(&db)
        .await
        .into_iter()
        .filter(|l| l.log_type == InventoryLogType::OrderPlaced)
        .count();
    assert_eq!(placed, 1);
}

#[tokio::test]
async fn racing_buyers_cannot_oversell_transactional() {
    let (db, coordinator) = coordinator(AtomicityMode::Transactional).await;
    let tomato = seed_product(&db, "Tomato", "farmer1", 40.0, 5).await;

    let buyer_a = RecordId::from_table_key("user", "buyer-a");
    let buyer_b = RecordId::from_table_key("user", "buyer-b");
    let lines_a = [line(&tomato, 3)];
    let lines_b = [line(&tomato, 3)];
    let (a, b) = tokio::join!(
        coordinator.place_cod_order(&buyer_a, &lines_a, address()),
        coordinator.place_cod_order(&buyer_b, &lines_b, address())
    );

    // The loser may see a clean insufficient-stock rejection or a
    // transaction conflict, but stock never goes negative and only one
    // order settles.
    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert_eq!(stock_of(&db, &tomato).await, 2);
    assert_eq!(all_orders(&db).await.len(), 1);
}
