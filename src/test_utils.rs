//! Shared test utilities for `Storefront`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    entities::{product, user, Role},
    errors::Result,
};
use sea_orm::{ActiveModelTrait, ConnectOptions, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// The pool is pinned to a single connection so that every query - including
/// concurrent ones - sees the same in-memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test category with an empty description.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<crate::entities::category::Model> {
    crate::core::catalog::create_category(db, name.to_string(), None).await
}

/// Creates a test product with the given price and stock.
///
/// The SKU is derived from the name so it stays unique across calls.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
    stock_quantity: i32,
    category_id: i64,
) -> Result<product::Model> {
    crate::core::catalog::create_product(
        db,
        crate::core::catalog::NewProduct {
            name: name.to_string(),
            description: Some(format!("{name} description")),
            price,
            sku: format!("SKU-{}", name.to_uppercase().replace(' ', "-")),
            stock_quantity,
            category_id,
            is_featured: false,
        },
    )
    .await
}

/// Inserts a test user directly, skipping the (slow) argon2 hashing.
///
/// Auth tests that care about real hashes go through `core::auth::register`
/// instead.
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    let now = chrono::Utc::now();
    let model = user::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set("test-hash".to_string()),
        role: Set(Role::Customer),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Sets up a complete test environment with a category.
/// Returns (db, category) for catalog-related tests.
pub async fn setup_with_category() -> Result<(
    DatabaseConnection,
    crate::entities::category::Model,
)> {
    let db = setup_test_db().await?;
    let category = create_test_category(&db, "Test Category").await?;
    Ok((db, category))
}

/// Sets up a complete test environment with a user and one in-stock product.
/// Returns (db, user, product) for cart and order tests.
pub async fn setup_with_user_and_product() -> Result<(
    DatabaseConnection,
    user::Model,
    product::Model,
)> {
    let db = setup_test_db().await?;
    let category = create_test_category(&db, "Test Category").await?;
    let product = create_test_product(&db, "Test Product", 10.0, 5, category.id).await?;
    let user = create_test_user(&db, "shopper@example.com").await?;
    Ok((db, user, product))
}
