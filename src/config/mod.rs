/// Database connection and schema creation
pub mod database;

/// Seed catalogue loading from config.toml
pub mod seed;

/// Runtime settings from environment variables
pub mod settings;

pub use settings::AppConfig;
