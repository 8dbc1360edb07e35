use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::*;
use crate::db;
use crate::db::models::{
    DeliveryAddress, DeliveryStatus, InventoryLogEntry, InventoryLogType, Order, PaymentMethod,
    PaymentStatus, Product, Unit,
};
use crate::payment::SignatureVerifier;

mod test_cancel;
mod test_modes;

const TEST_SECRET: &str = "test-gateway-secret";

async fn coordinator(mode: AtomicityMode) -> (Surreal<Db>, SettlementCoordinator) {
    let db = db::memory().await;
    let coordinator =
        SettlementCoordinator::new(db.clone(), mode, SignatureVerifier::new(TEST_SECRET));
    (db, coordinator)
}

fn buyer() -> RecordId {
    RecordId::from_table_key("user", "buyer1")
}

fn address() -> DeliveryAddress {
    DeliveryAddress {
        name: "Asha Menon".into(),
        phone: "9876543210".into(),
        address: "12 Farm Road".into(),
        district: "Thrissur".into(),
        state: "Kerala".into(),
        pincode: "680001".into(),
    }
}

async fn seed_product(
    db: &Surreal<Db>,
    name: &str,
    farmer_key: &str,
    price: f64,
    stock: i64,
) -> RecordId {
    let now = chrono::Utc::now();
    let product = Product {
        id: None,
        owner: RecordId::from_table_key("user", farmer_key),
        name: name.to_string(),
        description: format!("{name} from the farm"),
        price,
        image_url: String::new(),
        category: "vegetables".into(),
        stock,
        unit: Unit::Kg,
        is_organic: false,
        harvest_date: None,
        expiry_date: None,
        low_stock_threshold: 10,
        created_at: Some(now),
        updated_at: Some(now),
    };
    let created: Option<Product> = db.create("product").content(product).await.unwrap();
    created.unwrap().id.unwrap()
}

async fn stock_of(db: &Surreal<Db>, id: &RecordId) -> i64 {
    let product: Option<Product> = db.select(id.clone()).await.unwrap();
    product.unwrap().stock
}

async fn all_logs(db: &Surreal<Db>) -> Vec<InventoryLogEntry> {
    db.select("inventory_log").await.unwrap()
}

async fn all_orders(db: &Surreal<Db>) -> Vec<Order> {
    db.select("order").await.unwrap()
}

fn line(product: &RecordId, quantity: i64) -> CartLine {
    CartLine {
        product_id: product.to_string(),
        quantity,
    }
}
