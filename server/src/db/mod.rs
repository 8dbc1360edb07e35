//! Database Module
//!
//! Embedded SurrealDB connection handling. The handle is constructed once at
//! startup and passed into services explicitly; nothing reaches for a global
//! connection.

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::engine::local::{Db, RocksDb};
use surrealdb::Surreal;

use crate::utils::AppError;

const NAMESPACE: &str = "farmgate";
const DATABASE: &str = "main";

/// Database service - owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database under `db_dir`
    pub async fn new(db_dir: &Path) -> Result<Self, AppError> {
        let endpoint = db_dir.to_string_lossy().into_owned();
        let db = Surreal::new::<RocksDb>(endpoint)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        tracing::info!("Database connection established ({})", db_dir.display());

        Ok(Self { db })
    }
}

/// In-memory database for tests
#[cfg(test)]
pub async fn memory() -> Surreal<Db> {
    use surrealdb::engine::local::Mem;

    let db = Surreal::new::<Mem>(()).await.expect("in-memory db");
    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .expect("namespace selection");
    db
}
