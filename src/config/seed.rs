//! Seed catalogue loading from config.toml
//!
//! The seed catalogue lists the initial accounts, menu and QRIS settings. It is
//! read by the seed route and inserted into empty tables only.

use crate::entities::{product::ProductCategory, user::UserRole};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire seed file
#[derive(Debug, Deserialize)]
pub struct SeedConfig {
    /// Accounts to create
    #[serde(default)]
    pub users: Vec<SeedUser>,
    /// Menu items to create
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    /// Initial QRIS settings
    pub qris: Option<SeedQris>,
}

/// One seeded account
#[derive(Debug, Deserialize, Clone)]
pub struct SeedUser {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
    /// Admin or customer
    #[serde(default)]
    pub role: UserRole,
    /// Default delivery address
    pub address: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
}

/// One seeded menu item
#[derive(Debug, Deserialize, Clone)]
pub struct SeedProduct {
    /// Menu name
    pub name: String,
    /// Unit price in Rupiah
    pub price: i64,
    /// Menu description
    pub description: Option<String>,
    /// Photo URL
    pub image: Option<String>,
    /// Category bucket
    pub category: ProductCategory,
    /// Units per delivery day
    pub daily_limit: Option<i32>,
}

/// Seeded QRIS settings
#[derive(Debug, Deserialize, Clone)]
pub struct SeedQris {
    /// QR image URL
    pub image: Option<String>,
    /// Merchant name
    pub name: String,
    /// Merchant id
    pub number: String,
}

/// Loads the seed catalogue from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub async fn load_seed_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading seed catalogue from {}", path_ref.display());
    let contents = tokio::fs::read_to_string(path_ref).await.map_err(|e| Error::Config {
        message: format!("Failed to read seed file {}: {e}", path_ref.display()),
    })?;

    parse_seed_config(&contents)
}

/// Parses a seed catalogue from TOML text.
pub fn parse_seed_config(contents: &str) -> Result<SeedConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse seed catalogue: {e}"),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_seed_config() {
        let toml_str = r#"
            [[users]]
            name = "Admin"
            email = "admin@bakeryumkm.com"
            password = "admin123"
            role = "admin"

            [[users]]
            name = "John Doe"
            email = "john@example.com"
            password = "password123"
            address = "Jl. Contoh No. 123, Jakarta"

            [[products]]
            name = "Nastar"
            price = 115000
            category = "Kue Kering"
            daily_limit = 50

            [qris]
            name = "Bakery UMKM"
            number = "1234567890"
        "#;

        let config = parse_seed_config(toml_str).unwrap();
        assert_eq!(config.users.len(), 2);
        assert_eq!(config.users[0].role, UserRole::Admin);
        assert_eq!(config.users[1].role, UserRole::Customer);
        assert_eq!(config.products[0].category, ProductCategory::Dry);
        assert_eq!(config.products[0].daily_limit, Some(50));
        assert_eq!(config.qris.unwrap().number, "1234567890");
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let toml_str = r#"
            [[products]]
            name = "Roti Tawar"
            price = 20000
            category = "Roti"
        "#;
        assert!(matches!(
            parse_seed_config(toml_str),
            Err(Error::Config { .. })
        ));
    }

    #[tokio::test]
    async fn test_shipped_catalogue_parses() {
        let config = load_seed_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml"))
            .await
            .unwrap();
        assert!(config.users.iter().any(|u| u.role == UserRole::Admin));
        for category in ProductCategory::ALL {
            assert!(config.products.iter().any(|p| p.category == category));
        }
        assert!(config.qris.is_some());
    }

    #[tokio::test]
    async fn test_missing_seed_file_is_a_config_error() {
        let result = load_seed_config("does/not/exist.toml").await;
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
