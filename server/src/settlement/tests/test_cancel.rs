//! Cancellation workflow: restore stock, terminal states, guards

use super::*;

async fn place_two_line_order(
    db: &Surreal<Db>,
    coordinator: &SettlementCoordinator,
) -> (RecordId, RecordId, Order) {
    let tomato = seed_product(db, "Tomato", "farmer1", 40.0, 10).await;
    let spinach = seed_product(db, "Spinach", "farmer1", 25.0, 8).await;
    let order = coordinator
        .place_cod_order(&buyer(), &[line(&tomato, 3), line(&spinach, 2)], address())
        .await
        .unwrap();
    (tomato, spinach, order)
}

#[tokio::test]
async fn cancel_restores_stock_and_appends_logs() {
    let (db, coordinator) = coordinator(AtomicityMode::Transactional).await;
    let (tomato, spinach, order) = place_two_line_order(&db, &coordinator).await;
    let order_id = order.id.clone().unwrap();

    assert_eq!(stock_of(&db, &tomato).await, 7);
    assert_eq!(stock_of(&db, &spinach).await, 6);

    let cancelled = coordinator.cancel_order(&buyer(), &order_id).await.unwrap();

    assert_eq!(cancelled.delivery_status, DeliveryStatus::Cancelled);
    assert_eq!(cancelled.payment_status, PaymentStatus::Failed);
    assert_eq!(stock_of(&db, &tomato).await, 10);
    assert_eq!(stock_of(&db, &spinach).await, 8);

    let restores: Vec<_> = all_logs(&db)
        .await
        .into_iter()
        .filter(|l| l.log_type == InventoryLogType::OrderCancelled)
        .collect();
    assert_eq!(restores.len(), 2);
    for log in &restores {
        assert!(log.quantity > 0);
        assert_eq!(log.new_stock, log.previous_stock + log.quantity);
        assert_eq!(log.order.as_ref(), Some(&order_id));
    }
}

#[tokio::test]
async fn cancel_is_owner_only() {
    let (db, coordinator) = coordinator(AtomicityMode::Transactional).await;
    let (tomato, _spinach, order) = place_two_line_order(&db, &coordinator).await;
    let order_id = order.id.unwrap();

    let stranger = RecordId::from_table_key("user", "someone-else");
    let err = coordinator
        .cancel_order(&stranger, &order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::NotOwner));

    // Untouched
    assert_eq!(stock_of(&db, &tomato).await, 7);
}

#[tokio::test]
async fn double_cancel_does_not_restore_twice() {
    let (db, coordinator) = coordinator(AtomicityMode::Transactional).await;
    let (tomato, spinach, order) = place_two_line_order(&db, &coordinator).await;
    let order_id = order.id.unwrap();

    coordinator.cancel_order(&buyer(), &order_id).await.unwrap();
    let err = coordinator
        .cancel_order(&buyer(), &order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::AlreadyCancelled));

    // Stock restored exactly once
    assert_eq!(stock_of(&db, &tomato).await, 10);
    assert_eq!(stock_of(&db, &spinach).await, 8);
    let restores = all_logs(&db)
        .await
        .into_iter()
        .filter(|l| l.log_type == InventoryLogType::OrderCancelled)
        .count();
    assert_eq!(restores, 2);
}

#[tokio::test]
async fn shipped_order_is_cancel_immune() {
    let (db, coordinator) = coordinator(AtomicityMode::Transactional).await;
    let (tomato, _spinach, order) = place_two_line_order(&db, &coordinator).await;
    let order_id = order.id.unwrap();

    db.query("UPDATE $id SET delivery_status = 'shipped'")
        .bind(("id", order_id.clone()))
        .await
        .unwrap()
        .check()
        .unwrap();

    let err = coordinator
        .cancel_order(&buyer(), &order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::NotCancellable));

    // No restore happened
    assert_eq!(stock_of(&db, &tomato).await, 7);
    assert!(all_logs(&db)
        .await
        .iter()
        .all(|l| l.log_type != InventoryLogType::OrderCancelled));
}

#[tokio::test]
async fn missing_order_is_not_found() {
    let (_db, coordinator) = coordinator(AtomicityMode::Transactional).await;
    let ghost = RecordId::from_table_key("order", "ghost");
    let err = coordinator.cancel_order(&buyer(), &ghost).await.unwrap_err();
    assert!(matches!(err, SettlementError::OrderNotFound(_)));
}

#[tokio::test]
async fn cancelling_a_paid_order_marks_payment_failed() {
    let (db, coordinator) = coordinator(AtomicityMode::Transactional).await;
    let tomato = seed_product(&db, "Tomato", "farmer1", 40.0, 10).await;

    let signer = SignatureVerifier::new(TEST_SECRET);
    let assertion = PaymentAssertion {
        gateway_order_id: "order_G2".into(),
        gateway_payment_id: "pay_P2".into(),
        signature: signer.sign("order_G2", "pay_P2"),
    };
    let order = coordinator
        .place_paid_order(&buyer(), &[line(&tomato, 2)], address(), assertion)
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Completed);

    let cancelled = coordinator
        .cancel_order(&buyer(), &order.id.unwrap())
        .await
        .unwrap();

    // No refund state exists; cancellation forces `failed` even for a
    // previously completed payment
    assert_eq!(cancelled.payment_status, PaymentStatus::Failed);
    assert_eq!(stock_of(&db, &tomato).await, 10);
}
