//! Farmgate Server - direct farm-to-consumer order settlement backend
//!
//! # Architecture overview
//!
//! - **Inventory** (`inventory`): the authoritative stock ledger and its
//!   append-only audit log
//! - **Settlement** (`settlement`): the coordinator that makes order
//!   creation, stock decrement and audit logging succeed or fail together
//! - **Payment** (`payment`): gateway client and the HMAC signature gate
//! - **Database** (`db`): embedded SurrealDB storage and repositories
//! - **Auth** (`auth`): JWT bearer validation for the identity boundary
//! - **HTTP API** (`api`): axum routes and handlers
//!
//! # Module structure
//!
//! ```text
//! server/src/
//! ├── core/          # configuration, state, server bootstrap
//! ├── auth/          # JWT validation, caller extraction
//! ├── db/            # models and repositories
//! ├── inventory/     # stock ledger + audit log
//! ├── settlement/    # coordinator + unit-of-work executor
//! ├── payment/       # gateway client + signature verification
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # error envelope, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod inventory;
pub mod payment;
pub mod settlement;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService, Role};
pub use core::{Config, Server, ServerState};
pub use inventory::{AuditLog, InventoryService, StockLedger};
pub use payment::{PaymentGateway, SignatureVerifier};
pub use settlement::{AtomicityMode, SettlementCoordinator};
pub use utils::logger::{init_logger, init_logger_with_file};
pub use utils::{AppError, AppResponse, AppResult};

/// Load `.env` and set up logging. Call once at process start.
pub fn setup_environment() {
    dotenv::dotenv().ok();
    utils::logger::init_logger();
}
