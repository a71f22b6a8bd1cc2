//! Cart endpoints. All of them act on the authenticated user's own cart.

use crate::api::{AppState, CurrentUser};
use crate::core::cart;
use crate::errors::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    /// Product to add
    pub product_id: i64,
    /// Units to add, at least 1
    pub quantity: i32,
}

/// Body of `PUT /api/cart/items/{product_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    /// New quantity; zero removes the item
    pub quantity: i32,
}

/// One cart line in the view response.
#[derive(Debug, Serialize)]
pub struct CartLine {
    /// Product id
    pub product_id: i64,
    /// Product name at view time
    pub name: String,
    /// Live unit price
    pub unit_price: f64,
    /// Units in the cart
    pub quantity: i32,
    /// `unit_price * quantity`
    pub line_total: f64,
}

/// Response of `GET /api/cart`.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    /// Lines in the order they were added
    pub items: Vec<CartLine>,
    /// Sum of line totals, from live prices
    pub total: f64,
}

/// `GET /api/cart` - the caller's cart with live prices and total.
pub async fn view_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse> {
    let rows = cart::get_cart_items(&state.db, identity.user_id).await?;

    let items: Vec<CartLine> = rows
        .into_iter()
        .map(|(item, product)| CartLine {
            product_id: product.id,
            name: product.name,
            unit_price: product.price,
            quantity: item.quantity,
            line_total: product.price * f64::from(item.quantity),
        })
        .collect();
    let total = items.iter().map(|line| line.line_total).sum();

    Ok(Json(CartResponse { items, total }))
}

/// `POST /api/cart/items` - add a product, summing with any existing row.
pub async fn add_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(req): Json<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    let item = cart::add_item(&state.db, identity.user_id, req.product_id, req.quantity).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `PUT /api/cart/items/{product_id}` - set a row's quantity; zero removes it.
pub async fn update_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(product_id): Path<i64>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse> {
    let item =
        cart::update_quantity(&state.db, identity.user_id, product_id, req.quantity).await?;
    Ok(Json(item))
}

/// `DELETE /api/cart/items/{product_id}` - remove a row; idempotent.
pub async fn remove_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse> {
    cart::remove_item(&state.db, identity.user_id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/cart` - empty the cart; idempotent.
pub async fn clear_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse> {
    cart::clear_cart(&state.db, identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
