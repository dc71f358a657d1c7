//! Order item entity - One product line of an order.
//!
//! The unit price is copied from the product when the order is placed, so later
//! price changes do not alter existing orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order this line belongs to
    pub order_id: i64,
    /// Ordered product; cleared if the product is removed from the menu
    pub product_id: Option<i64>,
    /// Number of units
    pub quantity: i32,
    /// Unit price in Rupiah at the time of ordering
    pub price: i64,
    /// When the line was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// `quantity × price` for this line, saturating at `i64::MAX`.
    #[must_use]
    pub fn subtotal(&self) -> i64 {
        i64::from(self.quantity).saturating_mul(self.price)
    }
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order; lines go away with their order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
    /// Each line refers to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "SetNull"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
