use bakery_shop::{
    api::{self, AppState},
    config::{AppConfig, database},
    errors::Result,
};
use dotenvy::dotenv;
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

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let config = AppConfig::from_env()
        .inspect_err(|e| error!("Critical error loading application configuration: {e}"))?;

    // 4. Connect and make sure the schema and storage directory exist
    tokio::fs::create_dir_all(&config.storage_dir).await?;
    let db = database::create_connection(&config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Serve until shutdown
    api::serve(AppState::new(db, config)).await
}
