//! Admin dashboard figures.

use crate::{
    core::order::{self, OrderSummary},
    entities::{Product, User, order as order_entity, user},
    errors::Result,
};
use sea_orm::{FromQueryResult, PaginatorTrait, QuerySelect, prelude::*, sea_query::Expr};
use serde::Serialize;

/// Number of orders listed under "recent orders".
pub const RECENT_ORDERS: usize = 5;

/// Headline numbers for the admin landing page
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// Orders ever placed
    pub total_orders: u64,
    /// Σ order totals in Rupiah
    pub total_revenue: i64,
    /// Menu size
    pub total_products: u64,
    /// Customer accounts
    pub total_customers: u64,
    /// Newest orders first
    pub recent_orders: Vec<OrderSummary>,
}

#[derive(Debug, FromQueryResult)]
struct RevenueRow {
    revenue: Option<i64>,
}

/// Collects the dashboard figures.
pub async fn get_dashboard_stats(db: &DatabaseConnection) -> Result<DashboardStats> {
    let total_orders = order::count_orders(db).await?;

    let revenue = order_entity::Entity::find()
        .select_only()
        .column_as(Expr::col(order_entity::Column::Total).sum(), "revenue")
        .into_model::<RevenueRow>()
        .one(db)
        .await?
        .and_then(|row| row.revenue)
        .unwrap_or(0);

    let total_products = Product::find().count(db).await?;
    let total_customers = User::find()
        .filter(user::Column::Role.eq(user::UserRole::Customer))
        .count(db)
        .await?;

    let mut recent_orders = order::get_orders(db).await?;
    recent_orders.truncate(RECENT_ORDERS);

    Ok(DashboardStats {
        total_orders,
        total_revenue: revenue,
        total_products,
        total_customers,
        recent_orders,
    })
}
