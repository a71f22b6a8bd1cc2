//! Application settings, loaded once at startup from environment variables.
//!
//! A `.env` file is honored for local development (loaded in `main` via
//! `dotenvy` before this runs). Every variable has a development default
//! except where noted; malformed values are configuration errors rather
//! than silent fallbacks.

use crate::errors::{Error, Result};
use std::env;

/// Development-only signing secret, used when `TOKEN_SECRET` is unset.
const DEV_TOKEN_SECRET: &str = "storefront-dev-secret-change-in-production";

/// Runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface the HTTP server binds to
    pub host: String,
    /// Port the HTTP server binds to
    pub port: u16,
    /// SeaORM connection string
    pub database_url: String,
    /// HMAC secret for signing session tokens
    pub token_secret: String,
    /// Session token lifetime in minutes
    pub token_expiry_minutes: i64,
    /// Whether to create sample data on startup when the catalog is empty
    pub seed_db: bool,
}

impl AppConfig {
    /// Loads configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| Error::Config {
                message: format!("Invalid PORT: {e}"),
            })?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/storefront.sqlite?mode=rwc".to_string());

        let token_secret = env::var("TOKEN_SECRET").unwrap_or_else(|_| {
            tracing::warn!("TOKEN_SECRET not set, using the development default");
            DEV_TOKEN_SECRET.to_string()
        });

        let token_expiry_minutes = env::var("TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .map_err(|e| Error::Config {
                message: format!("Invalid TOKEN_EXPIRE_MINUTES: {e}"),
            })?;

        let seed_db = env::var("SEED_DB")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .map_err(|e| Error::Config {
                message: format!("Invalid SEED_DB value: {e}"),
            })?;

        Ok(Self {
            host,
            port,
            database_url,
            token_secret,
            token_expiry_minutes,
            seed_db,
        })
    }
}
