//! User entity - Customers and administrators of the shop.
//!
//! Customers place orders; administrators manage the catalogue, orders and
//! payment settings. Email addresses are unique across all accounts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role, stored as a short string
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Back-office administrator
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular shop customer
    #[default]
    #[sea_orm(string_value = "customer")]
    Customer,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, unique
    #[sea_orm(unique)]
    pub email: String,
    /// Login password
    #[serde(skip_serializing)]
    pub password: String,
    /// Admin or customer
    pub role: UserRole,
    /// Default delivery address
    pub address: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Whether this account may use the admin back office.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
