//! Product Repository
//!
//! Catalog reads and writes. Stock is not writable here: every stock
//! mutation goes through the inventory ledger's conditional update.

use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Product, ProductCreate, ProductUpdate};

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all products, optionally filtered by category, newest first
    pub async fn find_all(&self, category: Option<String>) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = match category {
            Some(cat) => self
                .base
                .db()
                .query("SELECT * FROM product WHERE category = $cat ORDER BY created_at DESC")
                .bind(("cat", cat))
                .await?
                .take(0)?,
            None => self
                .base
                .db()
                .query("SELECT * FROM product ORDER BY created_at DESC")
                .await?
                .take(0)?,
        };
        Ok(products)
    }

    /// Find all products owned by a farmer, newest first
    pub async fn find_by_owner(&self, owner: &RecordId) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE owner = $owner ORDER BY created_at DESC")
            .bind(("owner", owner.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    /// Find several products in one round trip (cart loading)
    pub async fn find_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE id IN $ids")
            .bind(("ids", ids.to_vec()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Create a new product listing for a farmer
    pub async fn create(&self, owner: RecordId, data: ProductCreate) -> RepoResult<Product> {
        if data.price <= 0.0 || !data.price.is_finite() {
            return Err(RepoError::Validation("price must be positive".into()));
        }
        if data.stock < 0 {
            return Err(RepoError::Validation("stock cannot be negative".into()));
        }

        let now = Utc::now();
        let product = Product {
            id: None,
            owner,
            name: data.name,
            description: data.description,
            price: data.price,
            image_url: data.image_url.unwrap_or_default(),
            category: data.category,
            stock: data.stock,
            unit: data.unit.unwrap_or_default(),
            is_organic: data.is_organic.unwrap_or(false),
            harvest_date: data.harvest_date,
            expiry_date: data.expiry_date,
            low_stock_threshold: data.low_stock_threshold.unwrap_or(10),
            created_at: Some(now),
            updated_at: Some(now),
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product listing; the owner guard is part of the update itself
    pub async fn update(
        &self,
        id: &RecordId,
        owner: &RecordId,
        data: ProductUpdate,
    ) -> RepoResult<Product> {
        let mut set_parts: Vec<&str> = Vec::new();

        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.image_url.is_some() {
            set_parts.push("image_url = $image_url");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.unit.is_some() {
            set_parts.push("unit = $unit");
        }
        if data.is_organic.is_some() {
            set_parts.push("is_organic = $is_organic");
        }
        if data.harvest_date.is_some() {
            set_parts.push("harvest_date = $harvest_date");
        }
        if data.expiry_date.is_some() {
            set_parts.push("expiry_date = $expiry_date");
        }
        if data.low_stock_threshold.is_some() {
            set_parts.push("low_stock_threshold = $low_stock_threshold");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        if let Some(p) = data.price {
            if p <= 0.0 || !p.is_finite() {
                return Err(RepoError::Validation("price must be positive".into()));
            }
        }

        set_parts.push("updated_at = $updated_at");
        let query_str = format!(
            "UPDATE $thing SET {} WHERE owner = $owner RETURN AFTER",
            set_parts.join(", ")
        );

        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("thing", id.clone()))
            .bind(("owner", owner.to_string()))
            .bind(("updated_at", Utc::now()));

        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.image_url {
            query = query.bind(("image_url", v));
        }
        if let Some(v) = data.category {
            query = query.bind(("category", v));
        }
        if let Some(v) = data.unit {
            query = query.bind(("unit", v));
        }
        if let Some(v) = data.is_organic {
            query = query.bind(("is_organic", v));
        }
        if let Some(v) = data.harvest_date {
            query = query.bind(("harvest_date", v));
        }
        if let Some(v) = data.expiry_date {
            query = query.bind(("expiry_date", v));
        }
        if let Some(v) = data.low_stock_threshold {
            query = query.bind(("low_stock_threshold", v));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;

        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }
}
