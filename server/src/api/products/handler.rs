//! Product API handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::parse_record_ref;
use crate::utils::{ok, AppError, AppResponse, AppResult};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// Catalog view of a product with the low-stock flag computed
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub low_stock: bool,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let low_stock = product.is_low_stock();
        Self { product, low_stock }
    }
}

/// Public catalog listing
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<ProductView>>>> {
    let products = state.products.find_all(query.category).await?;
    Ok(ok(products.into_iter().map(ProductView::from).collect()))
}

/// Farmer's own listings
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<ProductView>>>> {
    user.require_farmer()?;
    let products = state.products.find_by_owner(&user.id).await?;
    Ok(ok(products.into_iter().map(ProductView::from).collect()))
}

/// Public product detail
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<ProductView>>> {
    let product_ref = parse_record_ref("product", &id)
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    let product = state
        .products
        .find_by_id(&product_ref)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    Ok(ok(ProductView::from(product)))
}

/// Create a listing; opening stock lands in the audit log as STOCK_ADDED
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<AppResponse<Product>>> {
    user.require_farmer()?;

    let product = state.products.create(user.id.clone(), payload).await?;
    state.inventory.record_opening_stock(&product).await?;

    Ok(ok(product))
}

/// Update a listing (stock excluded by construction)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<AppResponse<Product>>> {
    user.require_farmer()?;

    let product_ref = parse_record_ref("product", &id)
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    let product = state
        .products
        .update(&product_ref, &user.id, payload)
        .await?;
    Ok(ok(product))
}
