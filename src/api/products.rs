//! Product and category endpoints.
//!
//! Listing and detail are public; creation, update, and deletion require the
//! admin role.

use crate::api::{AppState, CurrentUser};
use crate::core::catalog::{self, NewProduct, ProductFilter, ProductUpdate};
use crate::errors::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

/// Query parameters of `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Restrict to one category
    pub category_id: Option<i64>,
    /// Lowest acceptable price, inclusive
    pub min_price: Option<f64>,
    /// Highest acceptable price, inclusive
    pub max_price: Option<f64>,
    /// Case-insensitive substring over name and description
    pub search: Option<String>,
    /// Restrict to featured products
    pub featured: Option<bool>,
    /// Rows to skip
    pub offset: Option<u64>,
    /// Maximum rows to return
    pub limit: Option<u64>,
}

impl From<ProductQuery> for ProductFilter {
    fn from(query: ProductQuery) -> Self {
        Self {
            category_id: query.category_id,
            min_price: query.min_price,
            max_price: query.max_price,
            search: query.search,
            featured: query.featured,
            offset: query.offset,
            limit: query.limit,
        }
    }
}

/// Body of `POST /api/products` (admin).
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Display name
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Unit price in dollars
    pub price: f64,
    /// Unique stock-keeping unit
    pub sku: String,
    /// Initial units in stock
    pub stock_quantity: i32,
    /// Category the product belongs to
    pub category_id: i64,
    /// Whether to highlight the product
    #[serde(default)]
    pub is_featured: bool,
}

/// Body of `PUT /api/products/{id}` (admin). Unset fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    /// New display name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New unit price
    pub price: Option<f64>,
    /// New stock count
    pub stock_quantity: Option<i32>,
    /// New category
    pub category_id: Option<i64>,
    /// New featured flag
    pub is_featured: Option<bool>,
}

/// Body of `POST /api/categories` (admin).
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    /// Display name, unique across categories
    pub name: String,
    /// Optional longer description
    pub description: Option<String>,
}

/// `GET /api/products` - list active products matching the filter.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse> {
    let products = catalog::list_products(&state.db, &query.into()).await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}` - product detail.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let product = catalog::get_product(&state.db, product_id).await?;
    Ok(Json(product))
}

/// `POST /api/products` - create a product (admin).
pub async fn create_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    identity.require_admin()?;

    let product = catalog::create_product(
        &state.db,
        NewProduct {
            name: req.name,
            description: req.description,
            price: req.price,
            sku: req.sku,
            stock_quantity: req.stock_quantity,
            category_id: req.category_id,
            is_featured: req.is_featured,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}` - update a product (admin).
pub async fn update_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(product_id): Path<i64>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse> {
    identity.require_admin()?;

    let product = catalog::update_product(
        &state.db,
        product_id,
        ProductUpdate {
            name: req.name,
            description: req.description,
            price: req.price,
            stock_quantity: req.stock_quantity,
            category_id: req.category_id,
            is_featured: req.is_featured,
        },
    )
    .await?;

    Ok(Json(product))
}

/// `DELETE /api/products/{id}` - soft delete a product (admin).
pub async fn delete_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse> {
    identity.require_admin()?;

    let product = catalog::delete_product(&state.db, product_id).await?;
    Ok(Json(product))
}

/// `GET /api/categories` - list all categories.
pub async fn list_categories_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = catalog::list_categories(&state.db).await?;
    Ok(Json(categories))
}

/// `POST /api/categories` - create a category (admin).
pub async fn create_category_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse> {
    identity.require_admin()?;

    let category = catalog::create_category(&state.db, req.name, req.description).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
