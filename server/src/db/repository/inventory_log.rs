//! Inventory Log Repository
//!
//! Append and query only. There is no update or delete here on purpose.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{InventoryLogEntry, InventoryLogType};

const LOG_TABLE: &str = "inventory_log";

/// Query filters for the audit read surface
#[derive(Debug, Clone, Default)]
pub struct InventoryLogFilter {
    pub product: Option<RecordId>,
    pub log_type: Option<InventoryLogType>,
    pub limit: i64,
}

#[derive(Clone)]
pub struct InventoryLogRepository {
    base: BaseRepository,
}

impl InventoryLogRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Append one entry
    pub async fn insert(&self, entry: InventoryLogEntry) -> RepoResult<InventoryLogEntry> {
        let created: Option<InventoryLogEntry> = self
            .base
            .db()
            .create(LOG_TABLE)
            .content(entry)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create inventory log".to_string()))
    }

    /// Entries for one farmer, newest first, optionally narrowed by product
    /// and mutation type
    pub async fn find_for_farmer(
        &self,
        farmer: &RecordId,
        filter: InventoryLogFilter,
    ) -> RepoResult<Vec<InventoryLogEntry>> {
        let mut clauses = vec!["farmer = $farmer"];
        if filter.product.is_some() {
            clauses.push("product = $product");
        }
        if filter.log_type.is_some() {
            clauses.push("log_type = $log_type");
        }

        let query_str = format!(
            "SELECT * FROM inventory_log WHERE {} ORDER BY created_at DESC LIMIT $limit",
            clauses.join(" AND ")
        );

        let limit = if filter.limit > 0 { filter.limit } else { 50 };
        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("farmer", farmer.to_string()))
            .bind(("limit", limit));

        if let Some(product) = filter.product {
            query = query.bind(("product", product.to_string()));
        }
        if let Some(log_type) = filter.log_type {
            query = query.bind(("log_type", log_type));
        }

        let entries: Vec<InventoryLogEntry> = query.await?.take(0)?;
        Ok(entries)
    }
}
