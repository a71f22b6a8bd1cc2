//! Cart business logic - Handles all per-user shopping cart operations.
//!
//! A cart is the set of `cart_items` rows owned by one user. Adding a
//! product that is already in the cart sums quantities, and every mutation
//! re-validates the combined quantity against current stock. Removal and
//! clearing are idempotent. Totals are always computed from live product
//! prices, never cached.

use crate::{
    entities::{cart_item, product, CartItem, Product},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};

/// Adds a product to the user's cart, summing with any existing quantity.
///
/// The combined quantity is validated against current stock, so a cart can
/// never request more units than exist at add time (checkout re-validates
/// again later).
pub async fn add_item(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<cart_item::Model> {
    if quantity < 1 {
        return Err(Error::InvalidQuantity { quantity });
    }

    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| p.is_active)
        .ok_or(Error::ProductNotFound { id: product_id })?;

    let existing = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?;

    let combined = existing.as_ref().map_or(0, |item| item.quantity) + quantity;
    if combined > product.stock_quantity {
        return Err(Error::OutOfStock {
            product_id,
            requested: combined,
            available: product.stock_quantity,
        });
    }

    let now = chrono::Utc::now();
    match existing {
        Some(item) => {
            let mut model: cart_item::ActiveModel = item.into();
            model.quantity = Set(combined);
            model.updated_at = Set(now);
            model.update(db).await.map_err(Into::into)
        }
        None => {
            let model = cart_item::ActiveModel {
                user_id: Set(user_id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            model.insert(db).await.map_err(Into::into)
        }
    }
}

/// Sets the quantity of a cart row.
///
/// A quantity of zero deletes the row (a no-op when the row is absent);
/// negative quantities are rejected. Positive quantities replace the stored
/// value after re-validating against stock.
pub async fn update_quantity(
    db: &DatabaseConnection,
    user_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<Option<cart_item::Model>> {
    if quantity < 0 {
        return Err(Error::InvalidQuantity { quantity });
    }

    let existing = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?;

    if quantity == 0 {
        if let Some(item) = existing {
            item.delete(db).await?;
        }
        return Ok(None);
    }

    let item = existing.ok_or(Error::CartItemNotFound { product_id })?;

    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .filter(|p| p.is_active)
        .ok_or(Error::ProductNotFound { id: product_id })?;

    if quantity > product.stock_quantity {
        return Err(Error::OutOfStock {
            product_id,
            requested: quantity,
            available: product.stock_quantity,
        });
    }

    let mut model: cart_item::ActiveModel = item.into();
    model.quantity = Set(quantity);
    model.updated_at = Set(chrono::Utc::now());
    model.update(db).await.map(Some).map_err(Into::into)
}

/// Removes a product from the user's cart. Removing an absent item is a
/// no-op, not an error.
pub async fn remove_item(db: &DatabaseConnection, user_id: i64, product_id: i64) -> Result<()> {
    CartItem::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Empties the user's cart. Clearing an empty cart is a no-op.
pub async fn clear_cart<C>(db: &C, user_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    CartItem::delete_many()
        .filter(cart_item::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Retrieves the user's cart rows paired with their products, in the order
/// the items were added.
///
/// Generic over the connection so checkout can run it inside a transaction.
pub async fn get_cart_items<C>(
    db: &C,
    user_id: i64,
) -> Result<Vec<(cart_item::Model, product::Model)>>
where
    C: ConnectionTrait,
{
    let rows = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user_id))
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?;

    rows.into_iter()
        .map(|(item, product)| {
            let product_id = item.product_id;
            product.map(|p| (item, p)).ok_or(Error::Internal {
                message: format!("cart row references missing product {product_id}"),
            })
        })
        .collect()
}

/// Sums `unit_price * quantity` over the cart, using live product prices.
pub async fn cart_total<C>(db: &C, user_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let items = get_cart_items(db, user_id).await?;
    Ok(items
        .iter()
        .map(|(item, product)| product.price * f64::from(item.quantity))
        .sum())
}
