//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod order;
pub mod order_item;
pub mod product;
pub mod qris_settings;
pub mod user;

// Re-export specific types to avoid conflicts
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use qris_settings::{
    Column as QrisSettingsColumn, Entity as QrisSettings, Model as QrisSettingsModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
