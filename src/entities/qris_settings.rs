//! QRIS settings entity - The merchant QR code shown at checkout.
//!
//! Only the row with the lowest id is used.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// QRIS settings database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "qris_settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public URL of the QR image
    pub image: Option<String>,
    /// Merchant name printed under the code
    pub name: String,
    /// Merchant id (NMID)
    pub number: String,
    /// When the settings were first saved
    pub created_at: DateTimeUtc,
}

/// `QrisSettings` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
