//! Database Models

pub mod inventory_log;
pub mod order;
pub mod product;
pub mod serde_helpers;

pub use inventory_log::{InventoryLogEntry, InventoryLogType};
pub use order::{
    DeliveryAddress, DeliveryStatus, Order, OrderLine, PaymentMethod, PaymentStatus,
};
pub use product::{Product, ProductCreate, ProductUpdate, Unit};
