//! Shared test utilities for the bakery shop.
//!
//! This module provides helpers for setting up in-memory databases, scratch
//! storage directories and test records with sensible defaults.

use crate::{
    core::{
        order::{NewOrder, NewOrderItem, create_order},
        product::{self, ProductInput},
        user::{self, NewUser},
    },
    entities::{
        self,
        order::DeliveryMethod,
        product::ProductCategory,
        user::UserRole,
    },
    errors::Result,
    storage::Storage,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Password used by every test account.
pub const TEST_PASSWORD: &str = "secret123";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Storage rooted in a fresh directory under the system temp dir.
#[must_use]
pub fn temp_storage() -> Storage {
    let root = std::env::temp_dir().join(format!("bakery-shop-test-{}", uuid::Uuid::new_v4()));
    Storage::new(root, "bakery", "http://localhost:8080")
}

/// Registration input for a customer.
///
/// # Defaults
/// * `password`: [`TEST_PASSWORD`]
/// * `role`: customer
/// * `address`, `phone`: None
#[must_use]
pub fn new_customer(name: &str, email: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        role: UserRole::Customer,
        address: None,
        phone: None,
    }
}

/// Creates a customer account.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
) -> Result<entities::user::Model> {
    user::create_user(db, new_customer(name, email)).await
}

/// Creates the admin account `admin@example.com`.
pub async fn create_test_admin(db: &DatabaseConnection) -> Result<entities::user::Model> {
    let mut input = new_customer("Admin", "admin@example.com");
    input.role = UserRole::Admin;
    user::create_user(db, input).await
}

/// Product form input with a description and no daily limit.
#[must_use]
pub fn product_input(name: &str, price: i64, category: ProductCategory) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        price,
        description: Some(format!("{name} test description")),
        category,
        daily_limit: None,
    }
}

/// Creates a product without a photo.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    category: ProductCategory,
) -> Result<entities::product::Model> {
    product::create_product(db, &temp_storage(), product_input(name, price, category), None).await
}

/// One order line.
#[must_use]
pub const fn item(product_id: i64, quantity: i32, price: i64) -> NewOrderItem {
    NewOrderItem {
        product_id,
        quantity,
        price,
    }
}

/// Pickup order input whose total matches its lines.
#[must_use]
pub fn new_order(user_id: i64, items: Vec<NewOrderItem>) -> NewOrder {
    NewOrder {
        user_id,
        total: crate::core::order::items_total(&items).unwrap_or_default(),
        items,
        delivery_date: NaiveDate::from_ymd_opt(2030, 1, 15).unwrap_or_default(),
        payment_proof_url: None,
        address: "Jl. Contoh No. 123, Jakarta".to_string(),
        notes: None,
        delivery_method: DeliveryMethod::Pickup,
        shipping_method: None,
    }
}

/// Sets up a database with one customer.
/// Returns (db, customer).
pub async fn setup_with_customer() -> Result<(DatabaseConnection, entities::user::Model)> {
    let db = setup_test_db().await?;
    let customer = create_test_customer(&db, "Sari", "sari@example.com").await?;
    Ok((db, customer))
}

/// Sets up a database with a customer, one product and a pending order for it.
/// Returns (db, order).
pub async fn setup_with_order() -> Result<(DatabaseConnection, entities::order::Model)> {
    let (db, customer) = setup_with_customer().await?;
    let nastar = create_test_product(&db, "Nastar", 115_000, ProductCategory::Dry).await?;
    let order = create_order(&db, new_order(customer.id, vec![item(nastar.id, 2, 115_000)])).await?;
    Ok((db, order))
}
