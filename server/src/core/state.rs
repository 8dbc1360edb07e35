//! Server state
//!
//! Holds the shared handles every request needs. The database connection is
//! opened once here and injected into each service; nothing reads a global.

use std::sync::Arc;

use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::repository::{OrderRepository, ProductRepository};
use crate::db::DbService;
use crate::inventory::InventoryService;
use crate::payment::{PaymentGateway, SignatureVerifier};
use crate::settlement::{detect_mode, AtomicityMode, SettlementCoordinator};
use crate::utils::AppError;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub coordinator: Arc<SettlementCoordinator>,
    pub inventory: InventoryService,
    pub products: ProductRepository,
    pub orders: OrderRepository,
    pub gateway: Arc<PaymentGateway>,
}

impl ServerState {
    /// Initialize everything in dependency order:
    /// working directory, database, atomicity probe, services.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("work dir setup failed: {e}")))?;

        let db_service = DbService::new(&config.database_dir()).await?;
        let db = db_service.db;

        // The execution mode is fixed for the process lifetime; workflows
        // never re-probe per request.
        let mode = detect_mode(&db, config.atomicity).await;
        tracing::info!(mode = mode.as_str(), "settlement atomicity mode selected");

        Ok(Self::with_db(config.clone(), db, mode))
    }

    /// Wire services around an already-open database handle
    pub fn with_db(config: Config, db: Surreal<Db>, mode: AtomicityMode) -> Self {
        let verifier = SignatureVerifier::new(&config.payment.key_secret);
        let coordinator = Arc::new(SettlementCoordinator::new(db.clone(), mode, verifier));
        let gateway = Arc::new(PaymentGateway::new(
            config.payment.gateway_url.clone(),
            config.payment.key_id.clone(),
            config.payment.key_secret.clone(),
            config.payment.currency.clone(),
        ));

        Self {
            jwt_service: Arc::new(JwtService::new(config.jwt.clone())),
            inventory: InventoryService::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            coordinator,
            gateway,
            config,
            db,
        }
    }

    pub fn atomicity(&self) -> AtomicityMode {
        self.coordinator.atomicity()
    }
}
