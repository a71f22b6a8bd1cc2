//! Catalog business logic - Handles all product and category operations.
//!
//! This module provides functions for listing, filtering, and searching the
//! product catalog, plus the administrative create/update/delete operations.
//! Listing never errors on an empty result, search is a case-insensitive
//! substring match over name and description, and results keep insertion
//! order - there is no ranking. Products are soft-deleted via `is_active`
//! so order history keeps valid references.

use crate::{
    entities::{category, product, Category, Product},
    errors::{Error, Result},
};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{Condition, QueryOrder, QuerySelect, Set, prelude::*};

/// Page size applied when a listing request does not specify one.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Optional constraints for a product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Restrict to one category
    pub category_id: Option<i64>,
    /// Lowest acceptable price, inclusive
    pub min_price: Option<f64>,
    /// Highest acceptable price, inclusive
    pub max_price: Option<f64>,
    /// Case-insensitive substring matched against name and description
    pub search: Option<String>,
    /// Restrict to featured products
    pub featured: Option<bool>,
    /// Rows to skip
    pub offset: Option<u64>,
    /// Maximum rows to return
    pub limit: Option<u64>,
}

/// Fields for creating a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
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
    pub is_featured: bool,
}

/// Optional changes for an existing product. Unset fields are left as-is.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
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

/// Lists active products matching the filter, in insertion order.
///
/// No match yields an empty Vec, not an error.
pub async fn list_products(
    db: &DatabaseConnection,
    filter: &ProductFilter,
) -> Result<Vec<product::Model>> {
    let mut query = Product::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_asc(product::Column::Id);

    if let Some(category_id) = filter.category_id {
        query = query.filter(product::Column::CategoryId.eq(category_id));
    }
    if let Some(min_price) = filter.min_price {
        query = query.filter(product::Column::Price.gte(min_price));
    }
    if let Some(max_price) = filter.max_price {
        query = query.filter(product::Column::Price.lte(max_price));
    }
    if let Some(true) = filter.featured {
        query = query.filter(product::Column::IsFeatured.eq(true));
    }
    if let Some(term) = filter.search.as_deref() {
        let pattern = format!("%{}%", term.to_lowercase());
        query = query.filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        product::Entity,
                        product::Column::Name,
                    ))))
                    .like(pattern.clone()),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        product::Entity,
                        product::Column::Description,
                    ))))
                    .like(pattern),
                ),
        );
    }

    query
        .offset(filter.offset.unwrap_or(0))
        .limit(filter.limit.unwrap_or(DEFAULT_PAGE_SIZE))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product by its unique ID.
///
/// Inactive products are still returned here so order history and admin
/// screens can resolve them; listings and cart additions exclude them.
pub async fn get_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Lists featured, active products for the landing listing.
pub async fn featured_products(db: &DatabaseConnection, limit: u64) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::IsFeatured.eq(true))
        .filter(product::Column::IsActive.eq(true))
        .order_by_asc(product::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all categories, ordered alphabetically by name.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new category, rejecting empty or duplicate names.
pub async fn create_category(
    db: &DatabaseConnection,
    name: String,
    description: Option<String>,
) -> Result<category::Model> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Category name cannot be empty".to_string(),
        });
    }

    let existing = Category::find()
        .filter(category::Column::Name.eq(name.trim()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::InvalidInput {
            message: format!("Category '{}' already exists", name.trim()),
        });
    }

    let model = category::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Creates a new product, performing input validation.
pub async fn create_product(db: &DatabaseConnection, new: NewProduct) -> Result<product::Model> {
    if new.name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Product name cannot be empty".to_string(),
        });
    }
    if new.sku.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Product SKU cannot be empty".to_string(),
        });
    }
    if new.price < 0.0 || !new.price.is_finite() {
        return Err(Error::InvalidInput {
            message: format!("Invalid price: {}", new.price),
        });
    }
    if new.stock_quantity < 0 {
        return Err(Error::InvalidInput {
            message: format!("Invalid stock quantity: {}", new.stock_quantity),
        });
    }

    Category::find_by_id(new.category_id)
        .one(db)
        .await?
        .ok_or(Error::CategoryNotFound {
            id: new.category_id,
        })?;

    let now = chrono::Utc::now();
    let model = product::ActiveModel {
        name: Set(new.name.trim().to_string()),
        description: Set(new.description),
        price: Set(new.price),
        sku: Set(new.sku.trim().to_string()),
        stock_quantity: Set(new.stock_quantity),
        category_id: Set(new.category_id),
        is_featured: Set(new.is_featured),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Applies the given changes to an existing active product.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    changes: ProductUpdate,
) -> Result<product::Model> {
    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    if !existing.is_active {
        return Err(Error::ProductNotFound { id: product_id });
    }

    if let Some(name) = &changes.name {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput {
                message: "Product name cannot be empty".to_string(),
            });
        }
    }
    if let Some(price) = changes.price {
        if price < 0.0 || !price.is_finite() {
            return Err(Error::InvalidInput {
                message: format!("Invalid price: {price}"),
            });
        }
    }
    if let Some(stock) = changes.stock_quantity {
        if stock < 0 {
            return Err(Error::InvalidInput {
                message: format!("Invalid stock quantity: {stock}"),
            });
        }
    }
    if let Some(category_id) = changes.category_id {
        Category::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or(Error::CategoryNotFound { id: category_id })?;
    }

    let mut model: product::ActiveModel = existing.into();
    if let Some(name) = changes.name {
        model.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        model.description = Set(Some(description));
    }
    if let Some(price) = changes.price {
        model.price = Set(price);
    }
    if let Some(stock) = changes.stock_quantity {
        model.stock_quantity = Set(stock);
    }
    if let Some(category_id) = changes.category_id {
        model.category_id = Set(category_id);
    }
    if let Some(is_featured) = changes.is_featured {
        model.is_featured = Set(is_featured);
    }
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

/// Soft deletes a product by marking it inactive, preserving order history.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let existing = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;

    if !existing.is_active {
        return Err(Error::ProductNotFound { id: product_id });
    }

    let mut model: product::ActiveModel = existing.into();
    model.is_active = Set(false);
    model.updated_at = Set(chrono::Utc::now());

    model.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{
        create_test_category, create_test_product, setup_test_db, setup_with_category,
    };

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let (db, category) = setup_with_category().await?;

        // Empty name
        let result = create_product(
            &db,
            NewProduct {
                name: "  ".to_string(),
                description: None,
                price: 10.0,
                sku: "SKU-1".to_string(),
                stock_quantity: 1,
                category_id: category.id,
                is_featured: false,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        // Negative price
        let result = create_product(
            &db,
            NewProduct {
                name: "Widget".to_string(),
                description: None,
                price: -1.0,
                sku: "SKU-1".to_string(),
                stock_quantity: 1,
                category_id: category.id,
                is_featured: false,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        // Non-finite price
        let result = create_product(
            &db,
            NewProduct {
                name: "Widget".to_string(),
                description: None,
                price: f64::NAN,
                sku: "SKU-1".to_string(),
                stock_quantity: 1,
                category_id: category.id,
                is_featured: false,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        // Negative stock
        let result = create_product(
            &db,
            NewProduct {
                name: "Widget".to_string(),
                description: None,
                price: 10.0,
                sku: "SKU-1".to_string(),
                stock_quantity: -5,
                category_id: category.id,
                is_featured: false,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        // Unknown category
        let result = create_product(
            &db,
            NewProduct {
                name: "Widget".to_string(),
                description: None,
                price: 10.0,
                sku: "SKU-1".to_string(),
                stock_quantity: 1,
                category_id: 999,
                is_featured: false,
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CategoryNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_keeps_insertion_order() -> Result<()> {
        let (db, category) = setup_with_category().await?;

        let zebra = create_test_product(&db, "Zebra Print", 10.0, 5, category.id).await?;
        let apple = create_test_product(&db, "Apple Stand", 20.0, 5, category.id).await?;

        let products = list_products(&db, &ProductFilter::default()).await?;
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, zebra.id);
        assert_eq!(products[1].id, apple.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_filters_by_category_and_price() -> Result<()> {
        let db = setup_test_db().await?;
        let electronics = create_test_category(&db, "Electronics").await?;
        let furniture = create_test_category(&db, "Furniture").await?;

        let cheap = create_test_product(&db, "Cable", 5.0, 10, electronics.id).await?;
        let mid = create_test_product(&db, "Keyboard", 45.0, 10, electronics.id).await?;
        create_test_product(&db, "Desk", 250.0, 10, furniture.id).await?;

        let by_category = list_products(
            &db,
            &ProductFilter {
                category_id: Some(electronics.id),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_category.len(), 2);

        let by_price = list_products(
            &db,
            &ProductFilter {
                min_price: Some(10.0),
                max_price: Some(100.0),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(by_price.len(), 1);
        assert_eq!(by_price[0].id, mid.id);

        let both = list_products(
            &db,
            &ProductFilter {
                category_id: Some(electronics.id),
                max_price: Some(10.0),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id, cheap.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_over_name_and_description() -> Result<()> {
        let (db, category) = setup_with_category().await?;

        let laptop = create_test_product(&db, "Gaming Laptop", 999.0, 3, category.id).await?;
        let mouse = create_product(
            &db,
            NewProduct {
                name: "Mouse".to_string(),
                description: Some("Wireless mouse for LAPTOP users".to_string()),
                price: 25.0,
                sku: "SKU-MOUSE".to_string(),
                stock_quantity: 10,
                category_id: category.id,
                is_featured: false,
            },
        )
        .await?;
        create_test_product(&db, "Desk Lamp", 15.0, 10, category.id).await?;

        let results = list_products(
            &db,
            &ProductFilter {
                search: Some("lApToP".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, laptop.id);
        assert_eq!(results[1].id, mouse.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_search_without_match_returns_empty() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        create_test_product(&db, "Gaming Laptop", 999.0, 3, category.id).await?;

        let results = list_products(
            &db,
            &ProductFilter {
                search: Some("nonexistent".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert!(results.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_pagination() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        for i in 0..5 {
            create_test_product(&db, &format!("Product {i}"), 10.0, 1, category.id).await?;
        }

        let page = list_products(
            &db,
            &ProductFilter {
                offset: Some(1),
                limit: Some(2),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "Product 1");
        assert_eq!(page[1].name, "Product 2");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_product_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = get_product(&db, 999).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProductNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_product_hidden_from_listing_but_fetchable() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let product = create_test_product(&db, "Ephemeral", 10.0, 1, category.id).await?;

        let deleted = delete_product(&db, product.id).await?;
        assert!(!deleted.is_active);

        let listed = list_products(&db, &ProductFilter::default()).await?;
        assert!(listed.is_empty());

        // Still resolvable by id for order history
        let fetched = get_product(&db, product.id).await?;
        assert_eq!(fetched.id, product.id);

        // Deleting twice reports not found
        let result = delete_product(&db, product.id).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_product() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let product = create_test_product(&db, "Old Name", 10.0, 5, category.id).await?;

        let updated = update_product(
            &db,
            product.id,
            ProductUpdate {
                name: Some("New Name".to_string()),
                price: Some(12.5),
                stock_quantity: Some(8),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.stock_quantity, 8);
        // Untouched fields survive
        assert_eq!(updated.sku, product.sku);

        let result = update_product(
            &db,
            product.id,
            ProductUpdate {
                price: Some(-3.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_featured_products() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        create_test_product(&db, "Plain", 10.0, 5, category.id).await?;
        let featured = create_product(
            &db,
            NewProduct {
                name: "Showcase".to_string(),
                description: None,
                price: 99.0,
                sku: "SKU-SHOW".to_string(),
                stock_quantity: 2,
                category_id: category.id,
                is_featured: true,
            },
        )
        .await?;

        let results = featured_products(&db, 8).await?;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, featured.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_category_rejects_duplicates() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "Electronics").await?;

        let result = create_category(&db, "Electronics".to_string(), None).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        let categories = list_categories(&db).await?;
        assert_eq!(categories.len(), 1);

        Ok(())
    }
}
