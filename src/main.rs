use dotenvy::dotenv;
use std::sync::Arc;
use storefront::errors::Result;
use storefront::{api, config, seed};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::AppConfig::from_env()
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    info!("Configuration loaded");

    // 4. Initialize the database
    let db = config::database::create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Database connection established"))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed sample data (if enabled; skipped when the catalog is non-empty)
    if app_config.seed_db {
        seed::seed_sample_data(&db)
            .await
            .inspect_err(|e| error!("Failed to seed sample data: {e}"))?;
    }

    // 6. Serve the API
    let state = api::AppState {
        db,
        config: Arc::new(app_config),
    };
    api::serve(state).await
}
