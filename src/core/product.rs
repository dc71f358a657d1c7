//! Product business logic - the bakery menu.
//!
//! This module provides functions for listing, searching, creating, updating and
//! deleting products. Product photos are stored through [`Storage`]; replacing
//! or deleting a product also removes its old photo.

use crate::{
    core::validation,
    entities::{Product, product, product::ProductCategory},
    errors::{Error, Result},
    storage::{PRODUCTS_FOLDER, Storage, Upload},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

/// Product form input
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    /// Menu name
    pub name: String,
    /// Unit price in Rupiah
    pub price: i64,
    /// Menu description
    pub description: Option<String>,
    /// Category bucket
    pub category: ProductCategory,
    /// Units per delivery day
    pub daily_limit: Option<i32>,
}

/// Retrieves all products ordered alphabetically by name.
pub async fn get_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a product, failing with `Error::NotFound` if it does not exist.
pub async fn require_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    get_product_by_id(db, product_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "Product",
            id: product_id,
        })
}

/// Retrieves the products of one category ordered by name.
pub async fn get_products_by_category(
    db: &DatabaseConnection,
    category: ProductCategory,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::Category.eq(category))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds products whose name or description contains `query`.
///
/// A blank query returns the whole menu.
pub async fn search_products(
    db: &DatabaseConnection,
    query: &str,
) -> Result<Vec<product::Model>> {
    let query = query.trim();
    if query.is_empty() {
        return get_products(db).await;
    }

    Product::find()
        .filter(
            Condition::any()
                .add(product::Column::Name.contains(query))
                .add(product::Column::Description.contains(query)),
        )
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a product, uploading its photo first when one is given.
///
/// # Errors
/// Returns an error if:
/// - The name is blank, the price not positive or the daily limit below 1
/// - The photo is rejected by storage
/// - The database insert fails (the uploaded photo is removed again)
#[instrument(skip(db, storage, input, image), fields(name = %input.name))]
pub async fn create_product(
    db: &DatabaseConnection,
    storage: &Storage,
    input: ProductInput,
    image: Option<&Upload>,
) -> Result<product::Model> {
    validation::validate_product(&input.name, input.price, input.daily_limit)?;

    let image_url = match image {
        Some(upload) => Some(storage.upload_file(upload, PRODUCTS_FOLDER).await?),
        None => None,
    };

    let product = product::ActiveModel {
        name: Set(input.name.trim().to_string()),
        price: Set(input.price),
        description: Set(validation::non_blank(input.description)),
        image: Set(image_url.clone()),
        category: Set(input.category),
        daily_limit: Set(input.daily_limit),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    match product.insert(db).await {
        Ok(product) => {
            info!("Added product '{}' (ID: {})", product.name, product.id);
            Ok(product)
        }
        Err(e) => {
            error!("Error creating product: {e}");
            if let Some(url) = image_url {
                discard_image(storage, &url).await;
            }
            Err(e.into())
        }
    }
}

/// Updates a product. A new photo replaces the stored one, which is deleted
/// once the row has been updated.
///
/// # Errors
/// Returns an error if:
/// - The input fails validation
/// - The product does not exist
/// - The photo is rejected by storage
/// - The database update fails
#[instrument(skip(db, storage, input, image))]
pub async fn update_product(
    db: &DatabaseConnection,
    storage: &Storage,
    product_id: i64,
    input: ProductInput,
    image: Option<&Upload>,
) -> Result<product::Model> {
    validation::validate_product(&input.name, input.price, input.daily_limit)?;

    let existing = require_product(db, product_id).await?;
    let old_image = existing.image.clone();
    let mut product: product::ActiveModel = existing.into();

    let new_image = match image {
        Some(upload) => Some(storage.upload_file(upload, PRODUCTS_FOLDER).await?),
        None => None,
    };

    product.name = Set(input.name.trim().to_string());
    product.price = Set(input.price);
    product.description = Set(validation::non_blank(input.description));
    product.category = Set(input.category);
    product.daily_limit = Set(input.daily_limit);
    if let Some(url) = &new_image {
        product.image = Set(Some(url.clone()));
    }

    let updated = match product.update(db).await {
        Ok(updated) => updated,
        Err(e) => {
            error!("Error updating product {product_id}: {e}");
            if let Some(url) = new_image {
                discard_image(storage, &url).await;
            }
            return Err(e.into());
        }
    };

    if let (Some(_), Some(old)) = (&new_image, old_image) {
        discard_image(storage, &old).await;
    }

    Ok(updated)
}

/// Deletes a product and then its photo.
///
/// Order lines that referenced the product keep their price and quantity.
///
/// # Errors
/// Returns `Error::NotFound` if the product does not exist, or a database error.
#[instrument(skip(db, storage))]
pub async fn delete_product(
    db: &DatabaseConnection,
    storage: &Storage,
    product_id: i64,
) -> Result<()> {
    let product = require_product(db, product_id).await?;
    Product::delete_by_id(product_id).exec(db).await?;
    info!("Deleted product '{}' (ID: {product_id})", product.name);

    if let Some(url) = product.image {
        discard_image(storage, &url).await;
    }
    Ok(())
}

async fn discard_image(storage: &Storage, url: &str) {
    if let Err(e) = storage.delete_file(url).await {
        warn!("Could not delete image {url}: {e}");
    }
}
