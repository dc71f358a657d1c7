//! Back-office routes. Every handler requires an [`AdminUser`].

use super::{AppState, multipart::FormData, session::AdminUser};
use crate::{
    core::{
        dashboard::{self, DashboardStats},
        order::{self, OrderDetails, OrderSummary},
        product::{self, ProductInput},
        qris::{self, QrisInput},
        user::{self, NewUser, UserChanges},
        validation,
    },
    entities::{
        order::{Model as OrderModel, OrderStatus},
        product::Model as ProductModel,
        qris_settings,
        user::{Model as UserModel, UserRole},
    },
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Form part holding product and QRIS images
pub const IMAGE_FIELD: &str = "image";

/// Routes under `/api/admin`
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/dashboard", get(get_dashboard))
        .route("/api/admin/orders", get(list_orders))
        .route("/api/admin/orders/{id}", get(get_order).delete(delete_order))
        .route("/api/admin/orders/{id}/status", post(update_status))
        .route("/api/admin/products", get(list_products).post(create_product))
        .route(
            "/api/admin/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/admin/customers", get(list_customers).post(create_customer))
        .route(
            "/api/admin/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/api/admin/qris", get(get_qris).put(update_qris))
}

async fn get_dashboard(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<DashboardStats>> {
    dashboard::get_dashboard_stats(&state.db).await.map(Json)
}

// Orders

async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<OrderSummary>>> {
    order::get_orders(&state.db).await.map(Json)
}

#[derive(Debug, Serialize)]
struct AdminOrderView {
    #[serde(flatten)]
    details: OrderDetails,
    available_transitions: &'static [OrderStatus],
}

async fn get_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<AdminOrderView>> {
    let details = order::get_order_by_id(&state.db, id)
        .await?
        .ok_or(Error::NotFound { entity: "Order", id })?;
    let available_transitions = details.order.status.admin_transitions();
    Ok(Json(AdminOrderView {
        details,
        available_transitions,
    }))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: OrderStatus,
}

async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<OrderModel>> {
    let order = order::update_order_status(&state.db, id, req.status).await?;
    info!("Admin {} set order {id} to {}", admin.id, order.status);
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    order::delete_order(&state.db, &state.storage, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Products

fn product_input(form: &FormData) -> Result<ProductInput> {
    Ok(ProductInput {
        name: form.required("name")?,
        price: form.parse("price")?,
        description: form.optional("description"),
        category: form.parse("category")?,
        daily_limit: form.parse_optional("daily_limit")?,
    })
}

async fn list_products(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<ProductModel>>> {
    product::get_products(&state.db).await.map(Json)
}

async fn get_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<ProductModel>> {
    product::require_product(&state.db, id).await.map(Json)
}

async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ProductModel>)> {
    let form = FormData::read(multipart, IMAGE_FIELD).await?;
    let input = product_input(&form)?;
    let created =
        product::create_product(&state.db, &state.storage, input, form.file.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ProductModel>> {
    let form = FormData::read(multipart, IMAGE_FIELD).await?;
    let input = product_input(&form)?;
    product::update_product(&state.db, &state.storage, id, input, form.file.as_ref())
        .await
        .map(Json)
}

async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    product::delete_product(&state.db, &state.storage, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Customers

#[derive(Debug, Deserialize)]
struct CustomerRequest {
    name: String,
    email: String,
    password: String,
    password_confirmation: String,
    address: Option<String>,
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerChanges {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    password_confirmation: Option<String>,
    address: Option<String>,
    phone: Option<String>,
}

#[derive(Debug, Serialize)]
struct CustomerView {
    #[serde(flatten)]
    customer: UserModel,
    orders: Vec<OrderDetails>,
}

async fn require_customer(state: &AppState, id: i64) -> Result<UserModel> {
    let customer = user::require_user(&state.db, id).await?;
    if customer.role == UserRole::Customer {
        Ok(customer)
    } else {
        Err(Error::NotFound {
            entity: "Customer",
            id,
        })
    }
}

async fn list_customers(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserModel>>> {
    user::get_customers(&state.db).await.map(Json)
}

async fn create_customer(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<UserModel>)> {
    validation::validate_registration(
        &req.name,
        &req.email,
        &req.password,
        &req.password_confirmation,
    )?;
    let customer = user::create_user(
        &state.db,
        NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
            role: UserRole::Customer,
            address: req.address,
            phone: req.phone,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn get_customer(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<CustomerView>> {
    let customer = require_customer(&state, id).await?;
    let orders = order::get_orders_by_user_id(&state.db, id).await?;
    Ok(Json(CustomerView { customer, orders }))
}

async fn update_customer(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<CustomerChanges>,
) -> Result<Json<UserModel>> {
    require_customer(&state, id).await?;
    // Blank password fields on the edit form mean "keep the current one"
    let password = validation::non_blank(req.password);
    if let Some(password) = &password {
        validation::validate_password(password, req.password_confirmation.as_deref().unwrap_or(""))?;
    }

    let changes = UserChanges {
        name: req.name,
        email: req.email,
        password,
        role: None,
        address: req.address,
        phone: req.phone,
    };
    user::update_user(&state.db, id, changes).await.map(Json)
}

async fn delete_customer(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    require_customer(&state, id).await?;
    user::delete_user(&state.db, id).await?;
    state.sessions.remove_user(id).await;
    Ok(StatusCode::NO_CONTENT)
}

// QRIS

async fn get_qris(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Option<qris_settings::Model>>> {
    qris::get_qris_settings(&state.db).await.map(Json)
}

async fn update_qris(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> Result<Json<qris_settings::Model>> {
    let form = FormData::read(multipart, IMAGE_FIELD).await?;
    let input = QrisInput {
        name: form.required("name")?,
        number: form.required("number")?,
    };
    qris::update_qris_settings(&state.db, &state.storage, input, form.file.as_ref())
        .await
        .map(Json)
}
