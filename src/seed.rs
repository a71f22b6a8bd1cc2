//! Sample-data seeding for first startup.
//!
//! Creates a handful of categories and products plus an administrator
//! account so a fresh database is browsable immediately. Skipped entirely
//! when any category already exists, so it is safe to run on every startup.

use crate::core::{auth, catalog};
use crate::entities::{user, Category, Role};
use crate::errors::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QuerySelect, Set};
use tracing::{info, warn};

/// Admin login used when `ADMIN_EMAIL` is not set.
const DEFAULT_ADMIN_EMAIL: &str = "admin@storefront.test";
/// Admin password used when `ADMIN_PASSWORD` is not set.
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Seeds categories, products, and the admin account if the catalog is empty.
pub async fn seed_sample_data(db: &DatabaseConnection) -> Result<()> {
    let existing = Category::find().limit(1).all(db).await?;
    if !existing.is_empty() {
        info!("Sample data already present, skipping seeding");
        return Ok(());
    }

    let laptops = catalog::create_category(
        db,
        "Laptops".to_string(),
        Some("Portable machines for work and play".to_string()),
    )
    .await?;
    let peripherals = catalog::create_category(
        db,
        "Peripherals".to_string(),
        Some("Keyboards, mice, and other desk companions".to_string()),
    )
    .await?;
    let monitors = catalog::create_category(
        db,
        "Monitors".to_string(),
        Some("Displays of every size".to_string()),
    )
    .await?;

    let samples = [
        catalog::NewProduct {
            name: "Aero 14 Ultrabook".to_string(),
            description: Some("14\" ultralight with a full-day battery".to_string()),
            price: 899.0,
            sku: "LAP-AERO-14".to_string(),
            stock_quantity: 25,
            category_id: laptops.id,
            is_featured: true,
        },
        catalog::NewProduct {
            name: "Forge 17 Workstation".to_string(),
            description: Some("17\" desktop replacement for heavy builds".to_string()),
            price: 1799.0,
            sku: "LAP-FORGE-17".to_string(),
            stock_quantity: 10,
            category_id: laptops.id,
            is_featured: false,
        },
        catalog::NewProduct {
            name: "Quiet Type Mechanical Keyboard".to_string(),
            description: Some("Tenkeyless board with silent tactile switches".to_string()),
            price: 89.0,
            sku: "PER-KEYB-QT".to_string(),
            stock_quantity: 60,
            category_id: peripherals.id,
            is_featured: true,
        },
        catalog::NewProduct {
            name: "Glide Wireless Mouse".to_string(),
            description: Some("Low-latency wireless mouse, three-device pairing".to_string()),
            price: 49.0,
            sku: "PER-MOUSE-GL".to_string(),
            stock_quantity: 80,
            category_id: peripherals.id,
            is_featured: false,
        },
        catalog::NewProduct {
            name: "Crisp 27 4K Monitor".to_string(),
            description: Some("27\" 4K IPS panel with USB-C delivery".to_string()),
            price: 429.0,
            sku: "MON-CRISP-27".to_string(),
            stock_quantity: 18,
            category_id: monitors.id,
            is_featured: false,
        },
    ];
    for sample in samples {
        catalog::create_product(db, sample).await?;
    }

    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());
    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        warn!("ADMIN_PASSWORD not set, seeding admin with the default password");
        DEFAULT_ADMIN_PASSWORD.to_string()
    });

    let admin = auth::register(db, &admin_email, &admin_password).await?;
    let mut model: user::ActiveModel = admin.into();
    model.role = Set(Role::Admin);
    model.update(db).await?;

    info!("Seeded sample catalog and admin account '{admin_email}'");
    Ok(())
}
