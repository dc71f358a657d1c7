//! Product entity - Items on the bakery menu.
//!
//! Every product belongs to one of three category buckets. The bucket decides
//! which shipping methods can carry it (see `core::shipping`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Menu category, stored with its Indonesian display name
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ProductCategory {
    /// Kue Kering - dry cookies sold in jars
    #[sea_orm(string_value = "Kue Kering")]
    #[serde(rename = "Kue Kering", alias = "dry")]
    Dry,
    /// Kue Basah - wet snacks sold per piece
    #[sea_orm(string_value = "Kue Basah")]
    #[serde(rename = "Kue Basah", alias = "wet")]
    Wet,
    /// Kue Loyang - whole cakes sold per tin
    #[sea_orm(string_value = "Kue Loyang")]
    #[serde(rename = "Kue Loyang", alias = "layer")]
    Layer,
}

impl ProductCategory {
    /// All categories in menu order.
    pub const ALL: [Self; 3] = [Self::Dry, Self::Wet, Self::Layer];

    /// Name shown on the menu.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Dry => "Kue Kering",
            Self::Wet => "Kue Basah",
            Self::Layer => "Kue Loyang",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProductCategory {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "kue kering" | "kue_kering" | "dry" => Ok(Self::Dry),
            "kue basah" | "kue_basah" | "wet" => Ok(Self::Wet),
            "kue loyang" | "kue_loyang" | "layer" => Ok(Self::Layer),
            _ => Err(crate::errors::Error::validation(format!(
                "Unknown product category '{s}'"
            ))),
        }
    }
}

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Menu name (e.g., "Nastar")
    pub name: String,
    /// Unit price in whole Rupiah
    pub price: i64,
    /// Menu description
    pub description: Option<String>,
    /// Public URL of the product photo
    pub image: Option<String>,
    /// Category bucket
    pub category: ProductCategory,
    /// Maximum units that can be ordered for one delivery day
    pub daily_limit: Option<i32>,
    /// When the product was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product appears in many order lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_category_parses_display_names_and_aliases() {
        assert_eq!(
            "Kue Kering".parse::<ProductCategory>().unwrap(),
            ProductCategory::Dry
        );
        assert_eq!(
            "kue_basah".parse::<ProductCategory>().unwrap(),
            ProductCategory::Wet
        );
        assert_eq!(
            " layer ".parse::<ProductCategory>().unwrap(),
            ProductCategory::Layer
        );
        assert!("Roti".parse::<ProductCategory>().is_err());
    }

    #[test]
    fn test_category_serializes_with_display_name() {
        let json = serde_json::to_string(&ProductCategory::Layer).unwrap();
        assert_eq!(json, "\"Kue Loyang\"");
        let parsed: ProductCategory = serde_json::from_str("\"wet\"").unwrap();
        assert_eq!(parsed, ProductCategory::Wet);
    }
}
