//! Order business logic - Checkout and the order status state machine.
//!
//! `place_order` converts a cart snapshot into an immutable order inside a
//! single database transaction: stock is decremented with a conditional
//! update per product, unit prices are frozen into line items, and the cart
//! is cleared. Either every step commits or none do, so a failed checkout
//! leaves stock, cart, and order tables untouched and partial orders cannot
//! exist. The conditional update also serializes concurrent checkouts on
//! the same product: the statement only matches while enough stock remains,
//! so overselling the last unit is impossible.

use crate::{
    core::cart,
    entities::{order, order_item, product, Order, OrderItem, OrderStatus, Product},
    errors::{Error, Result},
};
use sea_orm::sea_query::Expr;
use sea_orm::{ConnectionTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};

/// Places an order from the user's current cart.
///
/// Stock availability is re-validated per line item at checkout time, not
/// add-to-cart time. Any shortfall fails the whole operation with
/// `OutOfStock` and rolls back - there are no partial orders.
pub async fn place_order(
    db: &DatabaseConnection,
    user_id: i64,
    shipping_address: String,
    phone: Option<String>,
) -> Result<order::Model> {
    if shipping_address.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Shipping address cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    let items = cart::get_cart_items(&txn, user_id).await?;
    if items.is_empty() {
        return Err(Error::EmptyCart);
    }

    let mut total = 0.0;
    for (item, product) in &items {
        decrement_stock(&txn, item.product_id, item.quantity).await?;
        total += product.price * f64::from(item.quantity);
    }

    let now = chrono::Utc::now();
    let placed = order::ActiveModel {
        user_id: Set(user_id),
        status: Set(OrderStatus::Pending),
        total_amount: Set(total),
        shipping_address: Set(shipping_address.trim().to_string()),
        phone: Set(phone),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    // Freeze unit prices into the line items
    for (item, product) in &items {
        order_item::ActiveModel {
            order_id: Set(placed.id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            unit_price: Set(product.price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    cart::clear_cart(&txn, user_id).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = placed.id,
        user_id,
        total = placed.total_amount,
        "order placed"
    );
    Ok(placed)
}

/// Atomically takes `quantity` units off a product's stock.
///
/// The conditional `stock_quantity >= quantity` guard makes the decrement a
/// compare-and-decrement: under concurrent checkouts only one caller can win
/// the last units, and the stock column can never go negative.
async fn decrement_stock<C>(db: &C, product_id: i64, quantity: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Product::update_many()
        .col_expr(
            product::Column::StockQuantity,
            Expr::col(product::Column::StockQuantity).sub(quantity),
        )
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::StockQuantity.gte(quantity))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let available = Product::find_by_id(product_id)
            .one(db)
            .await?
            .map_or(0, |p| p.stock_quantity);
        return Err(Error::OutOfStock {
            product_id,
            requested: quantity,
            available,
        });
    }
    Ok(())
}

/// Atomically puts `quantity` units back onto a product's stock.
async fn restore_stock<C>(db: &C, product_id: i64, quantity: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    Product::update_many()
        .col_expr(
            product::Column::StockQuantity,
            Expr::col(product::Column::StockQuantity).add(quantity),
        )
        .filter(product::Column::Id.eq(product_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Retrieves an order by its unique ID.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })
}

/// Retrieves the line items of an order.
pub async fn get_order_items(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<order_item::Model>> {
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a user's orders, newest first.
pub async fn get_user_orders(db: &DatabaseConnection, user_id: i64) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves recent orders across all users, newest first.
pub async fn list_orders(db: &DatabaseConnection, limit: u64) -> Result<Vec<order::Model>> {
    Order::find()
        .order_by_desc(order::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves recent orders in one status, newest first.
pub async fn orders_by_status(
    db: &DatabaseConnection,
    status: OrderStatus,
    limit: u64,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::Status.eq(status))
        .order_by_desc(order::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves an order to a new status, enforcing the state machine.
///
/// Only forward transitions are permitted; anything else fails with
/// `InvalidTransition`. Cancelling a `Pending` or `Paid` order atomically
/// restores every line item's decremented stock.
pub async fn update_status(
    db: &DatabaseConnection,
    order_id: i64,
    new_status: OrderStatus,
) -> Result<order::Model> {
    let txn = db.begin().await?;

    let existing = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    if !existing.status.can_transition_to(new_status) {
        return Err(Error::InvalidTransition {
            from: existing.status,
            to: new_status,
        });
    }

    if new_status == OrderStatus::Cancelled {
        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&txn)
            .await?;
        for item in items {
            restore_stock(&txn, item.product_id, item.quantity).await?;
        }
    }

    let previous = existing.status;
    let mut model: order::ActiveModel = existing.into();
    model.status = Set(new_status);
    model.updated_at = Set(chrono::Utc::now());
    let updated = model.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id, %previous, %new_status, "order status updated");
    Ok(updated)
}
