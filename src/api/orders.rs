//! Order endpoints.
//!
//! Customers see only their own orders; the admin role unlocks the global
//! listing and status updates.

use crate::api::{AppState, CurrentUser};
use crate::core::order;
use crate::entities::{order::Model as OrderModel, order_item, OrderStatus, Role};
use crate::errors::{Error, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/orders`.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    /// Delivery destination
    pub shipping_address: String,
    /// Optional contact phone number
    pub phone: Option<String>,
}

/// Query parameters of `GET /api/orders`.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    /// When true (admin only), list orders across all users
    #[serde(default)]
    pub all: bool,
    /// Restrict the admin listing to one status
    pub status: Option<OrderStatus>,
}

/// Body of `PUT /api/orders/{id}/status` (admin).
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status
    pub status: OrderStatus,
}

/// An order together with its frozen line items.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// The order record
    pub order: OrderModel,
    /// Its line items with purchase-time prices
    pub items: Vec<order_item::Model>,
}

async fn order_with_items(state: &AppState, placed: OrderModel) -> Result<OrderResponse> {
    let items = order::get_order_items(&state.db, placed.id).await?;
    Ok(OrderResponse {
        order: placed,
        items,
    })
}

/// `POST /api/orders` - place an order from the caller's cart.
pub async fn create_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse> {
    let placed =
        order::place_order(&state.db, identity.user_id, req.shipping_address, req.phone).await?;
    let response = order_with_items(&state, placed).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /api/orders` - the caller's orders, or all orders with `?all=true`
/// for admins, optionally narrowed with `?status=`.
pub async fn list_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(query): Query<ListOrdersQuery>,
) -> Result<impl IntoResponse> {
    let orders = if query.all {
        identity.require_admin()?;
        match query.status {
            Some(status) => order::orders_by_status(&state.db, status, 100).await?,
            None => order::list_orders(&state.db, 100).await?,
        }
    } else {
        order::get_user_orders(&state.db, identity.user_id).await?
    };
    Ok(Json(orders))
}

/// `GET /api/orders/{id}` - order detail with line items.
///
/// Another user's order reads as not-found rather than forbidden, so order
/// ids cannot be probed.
pub async fn get_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(order_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let found = order::get_order(&state.db, order_id).await?;
    if found.user_id != identity.user_id && identity.role != Role::Admin {
        return Err(Error::OrderNotFound { id: order_id });
    }

    let response = order_with_items(&state, found).await?;
    Ok(Json(response))
}

/// `PUT /api/orders/{id}/status` - move an order along the state machine
/// (admin).
pub async fn status_handler(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(order_id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse> {
    identity.require_admin()?;

    let updated = order::update_status(&state.db, order_id, req.status).await?;
    Ok(Json(updated))
}
