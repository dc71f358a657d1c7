//! One-time seed route.

use super::AppState;
use crate::{
    config::seed::load_seed_config,
    core::seed::{SeedReport, seed_all},
    errors::Result,
};
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

/// `GET /api/seed`
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/seed", get(run_seed))
}

#[derive(Debug, Serialize)]
struct SeedResponse {
    message: &'static str,
    inserted: SeedReport,
}

async fn run_seed(State(state): State<AppState>) -> Result<Json<SeedResponse>> {
    let catalogue = load_seed_config(&state.config.seed_config).await?;
    let inserted = seed_all(&state.db, &catalogue).await?;
    let message = if inserted.is_empty() {
        "Database already seeded"
    } else {
        "Database seeded"
    };
    Ok(Json(SeedResponse { message, inserted }))
}
