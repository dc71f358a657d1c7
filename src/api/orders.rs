//! Customer order routes: checkout, order history and payment proofs.
//!
//! Checkout and proof uploads are multipart forms. The checkout form carries
//! the order as a JSON document in the `order` field and an optional
//! `payment_proof` file.

use super::{AppState, multipart::FormData, session::CurrentUser};
use crate::{
    core::{
        cart::{self, Checkout},
        order::{self, OrderDetails},
    },
    entities::order::Model as OrderModel,
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
};

/// Form part holding the proof image
pub const PROOF_FIELD: &str = "payment_proof";

/// Customer order routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(my_orders).post(place_order))
        .route("/api/orders/{id}", get(my_order))
        .route("/api/orders/{id}/payment-proof", post(upload_payment_proof))
}

async fn place_order(
    State(state): State<AppState>,
    current: CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<OrderModel>)> {
    let form = FormData::read(multipart, PROOF_FIELD).await?;
    let checkout: Checkout = form.json("order")?;
    let today = chrono::Local::now().date_naive();

    let order = cart::checkout(
        &state.db,
        &state.storage,
        current.user.id,
        checkout,
        form.file.as_ref(),
        today,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn my_orders(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<OrderDetails>>> {
    order::get_orders_by_user_id(&state.db, current.user.id)
        .await
        .map(Json)
}

async fn owned_order(state: &AppState, current: &CurrentUser, id: i64) -> Result<OrderModel> {
    let order = order::get_order(&state.db, id)
        .await?
        .ok_or(Error::NotFound { entity: "Order", id })?;
    if order.user_id != Some(current.user.id) && !current.user.is_admin() {
        return Err(Error::Forbidden);
    }
    Ok(order)
}

async fn my_order(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetails>> {
    owned_order(&state, &current, id).await?;
    order::get_order_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or(Error::NotFound { entity: "Order", id })
}

async fn upload_payment_proof(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<OrderModel>> {
    owned_order(&state, &current, id).await?;
    let form = FormData::read(multipart, PROOF_FIELD).await?;
    let proof = form
        .file
        .ok_or_else(|| Error::validation("Attach a payment proof image"))?;

    order::update_order_payment_proof(&state.db, &state.storage, id, &proof)
        .await
        .map(Json)
}
