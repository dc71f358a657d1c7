//! Order entity - A customer's order for one delivery date.
//!
//! The order row stores the total captured at checkout; the individual lines
//! live in `order_item`. Status changes follow the lifecycle in
//! `core::lifecycle`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Where an order is in its lifecycle
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, no payment proof yet
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Payment proof uploaded, waiting for the admin to confirm it
    #[sea_orm(string_value = "waiting_payment")]
    WaitingPayment,
    /// Payment confirmed, being baked
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Delivered or picked up
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Cancelled before payment was confirmed
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Wire/database identifier of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::WaitingPayment => "waiting_payment",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "waiting_payment" => Ok(Self::WaitingPayment),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(crate::errors::Error::validation(format!(
                "Unknown order status '{other}'"
            ))),
        }
    }
}

/// How the order reaches the customer
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Customer collects the order at the bakery
    #[default]
    #[sea_orm(string_value = "pickup")]
    Pickup,
    /// Order is sent with a shipping method
    #[sea_orm(string_value = "delivery")]
    Delivery,
}

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer who placed the order; cleared if the account is deleted
    pub user_id: Option<i64>,
    /// Σ quantity × price of the order lines, in Rupiah
    pub total: i64,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Requested delivery or pickup day
    pub delivery_date: Date,
    /// Public URL of the uploaded payment proof
    pub payment_proof: Option<String>,
    /// Delivery address
    pub address: String,
    /// Free-form notes from the customer
    pub notes: Option<String>,
    /// Pickup or delivery
    pub delivery_method: DeliveryMethod,
    /// Shipping method id when `delivery_method` is delivery
    pub shipping_method: Option<String>,
    /// When the order was placed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,
    /// One order has many lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
