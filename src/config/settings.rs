//! Runtime settings read from the environment.
//!
//! Every variable has a default so a bare `cargo run` works against a local
//! `SQLite` file. Values that are present but unparseable are a hard error.

use crate::errors::{Error, Result};
use std::{
    env::{self, VarError},
    fmt::Display,
    net::SocketAddr,
    path::PathBuf,
    str::FromStr,
};
use tracing::{debug, info};

/// Application configuration shared by the HTTP layer and storage
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `SeaORM` connection URL
    pub database_url: String,
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Externally visible base URL, used to build public blob URLs
    pub public_url: String,
    /// Directory holding the storage bucket
    pub storage_dir: PathBuf,
    /// Bucket name under `storage_dir`
    pub storage_bucket: String,
    /// Path to the TOML seed catalogue
    pub seed_config: PathBuf,
    /// Largest accepted request body for uploads
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Reads the configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            database_url: try_load("DATABASE_URL", "sqlite://data/bakery.sqlite?mode=rwc")?,
            host: try_load("HOST", "0.0.0.0")?,
            port: try_load("PORT", "8080")?,
            public_url: try_load::<String>("PUBLIC_URL", "http://localhost:8080")?
                .trim_end_matches('/')
                .to_string(),
            storage_dir: try_load("STORAGE_DIR", "data/storage")?,
            storage_bucket: try_load("STORAGE_BUCKET", "bakery")?,
            seed_config: try_load("SEED_CONFIG", "config.toml")?,
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "5242880")?,
        };
        debug!("Loaded configuration: {config:?}");
        Ok(config)
    }

    /// Socket address the server listens on.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config {
                message: format!("Invalid HOST/PORT combination: {e}"),
            })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    parse_var(key, env::var(key), default)
}

fn parse_var<T: FromStr>(
    key: &str,
    value: std::result::Result<String, VarError>,
    default: &str,
) -> Result<T>
where
    T::Err: Display,
{
    let raw = match value {
        Ok(raw) => raw,
        Err(VarError::NotPresent) => {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }
        Err(e) => return Err(e.into()),
    };

    raw.parse().map_err(|e| Error::Config {
        message: format!("Invalid {key} value '{raw}': {e}"),
    })
}
