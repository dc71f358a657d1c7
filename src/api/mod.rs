//! HTTP interface - JSON API over axum.
//!
//! The router is assembled from one route table per area. Uploaded blobs are
//! served read-only from the storage root under `/storage`.

use crate::{
    config::AppConfig,
    errors::Result,
    storage::{PUBLIC_PREFIX, Storage},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use sea_orm::DatabaseConnection;
use std::{sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info};

mod admin;
mod auth;
mod catalog;
mod error;
mod multipart;
mod orders;
mod seed;
pub mod session;

use session::SessionStore;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Database pool
    pub db: Arc<DatabaseConnection>,
    /// Blob storage for uploads
    pub storage: Arc<Storage>,
    /// Logged-in sessions
    pub sessions: SessionStore,
    /// Runtime settings
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Bundles the shared services, deriving storage from `config`.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db: Arc::new(db),
            storage: Arc::new(Storage::from_config(&config)),
            sessions: SessionStore::default(),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let blobs = ServeDir::new(state.storage.root());

    Router::new()
        .merge(seed::routes())
        .merge(auth::routes())
        .merge(catalog::routes())
        .merge(orders::routes())
        .merge(admin::routes())
        .nest_service(PUBLIC_PREFIX, blobs)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState) -> Result<()> {
    let address = state.config.bind_address()?;
    let listener = TcpListener::bind(address).await?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
