//! Product entity - Represents purchasable items in the catalog.
//!
//! Each product has a price, a stock quantity, and a category. Products are
//! soft-deleted via `is_active` so historical orders keep their references.
//! The invariant enforced by the order processor: `stock_quantity` never
//! goes negative.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the product
    pub name: String,
    /// Optional longer description, searched together with the name
    pub description: Option<String>,
    /// Unit price in dollars, never negative
    pub price: f64,
    /// Stock-keeping unit, unique per product
    #[sea_orm(unique)]
    pub sku: String,
    /// Units currently available for purchase
    pub stock_quantity: i32,
    /// ID of the category this product belongs to
    pub category_id: i64,
    /// Whether the product is highlighted on the landing listing
    pub is_featured: bool,
    /// Soft delete flag - inactive products are hidden and unpurchasable
    pub is_active: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// One product appears in many cart rows
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    /// One product appears in many order line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
