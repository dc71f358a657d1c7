//! Public storefront routes: menu, QRIS details and shipping quotes.

use super::AppState;
use crate::{
    core::{
        cart::{self, CartRequest, PricedCart},
        product, qris,
        shipping::{CategoryCaps, ShippingMethod},
    },
    entities::{product::ProductCategory, product::Model as ProductModel, qris_settings},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

/// Public storefront routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/qris", get(get_qris))
        .route("/api/shipping/quote", post(shipping_quote))
}

#[derive(Debug, Deserialize)]
struct ProductQuery {
    category: Option<String>,
    q: Option<String>,
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductModel>>> {
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(str::parse::<ProductCategory>)
        .transpose()?;

    let products = match (query.q.as_deref(), category) {
        (Some(q), category) => {
            let mut found = product::search_products(&state.db, q).await?;
            if let Some(category) = category {
                found.retain(|p| p.category == category);
            }
            found
        }
        (None, Some(category)) => product::get_products_by_category(&state.db, category).await?,
        (None, None) => product::get_products(&state.db).await?,
    };
    Ok(Json(products))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductModel>> {
    product::require_product(&state.db, id).await.map(Json)
}

async fn get_qris(State(state): State<AppState>) -> Result<Json<qris_settings::Model>> {
    qris::get_qris_settings(&state.db)
        .await?
        .map(Json)
        .ok_or(Error::NotFound {
            entity: "QRIS settings",
            id: 1,
        })
}

#[derive(Debug, Deserialize)]
struct QuoteRequest {
    items: Vec<CartRequest>,
}

#[derive(Debug, Serialize)]
struct MethodOption {
    id: &'static str,
    label: &'static str,
    caps: CategoryCaps,
}

impl From<ShippingMethod> for MethodOption {
    fn from(method: ShippingMethod) -> Self {
        Self {
            id: method.id(),
            label: method.label(),
            caps: method.caps(),
        }
    }
}

#[derive(Debug, Serialize)]
struct QuoteResponse {
    cart: PricedCart,
    methods: Vec<MethodOption>,
}

async fn shipping_quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let cart = cart::price_cart(&state.db, &req.items).await?;
    let methods = cart
        .eligible_shipping()
        .into_iter()
        .map(MethodOption::from)
        .collect();
    Ok(Json(QuoteResponse { cart, methods }))
}
