/// Database connection and table creation
pub mod database;

/// Application settings loaded from environment variables
pub mod settings;

pub use settings::AppConfig;
