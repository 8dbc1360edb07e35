//! Repository Module
//!
//! Data access for SurrealDB tables. One repository per table; record
//! references are stored as "table:id" strings, record ids themselves are
//! native `RecordId`s.

pub mod inventory_log;
pub mod order;
pub mod product;

pub use inventory_log::InventoryLogRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;

use surrealdb::engine::local::Db;
use surrealdb::Surreal;
use thiserror::Error;

use crate::utils::AppError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Accept both `"table:key"` and bare `"key"` record references from
/// clients. Returns `None` for empty or unparseable input.
pub fn parse_record_ref(table: &str, raw: &str) -> Option<surrealdb::RecordId> {
    if raw.is_empty() {
        return None;
    }
    if raw.contains(':') {
        raw.parse::<surrealdb::RecordId>().ok()
    } else {
        Some(surrealdb::RecordId::from_table_key(table, raw))
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
