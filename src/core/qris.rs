//! QRIS settings - the merchant QR code customers pay with.
//!
//! Only the row with the lowest id is read or written.

use crate::{
    core::validation,
    entities::{QrisSettings, qris_settings},
    errors::Result,
    storage::{QRIS_FOLDER, Storage, Upload},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// QRIS settings form
#[derive(Debug, Clone, Deserialize)]
pub struct QrisInput {
    /// Merchant name
    pub name: String,
    /// Merchant id
    pub number: String,
}

/// Retrieves the active QRIS settings, if any were saved.
pub async fn get_qris_settings(
    db: &DatabaseConnection,
) -> Result<Option<qris_settings::Model>> {
    QrisSettings::find()
        .order_by_asc(qris_settings::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates or updates the QRIS settings.
///
/// A new image replaces the stored one, whose file is then deleted.
///
/// # Errors
/// Returns an error if the name or number is blank, storage rejects the image,
/// or the database write fails.
#[instrument(skip(db, storage, input, image))]
pub async fn update_qris_settings(
    db: &DatabaseConnection,
    storage: &Storage,
    input: QrisInput,
    image: Option<&Upload>,
) -> Result<qris_settings::Model> {
    validation::require("Merchant name", &input.name)?;
    validation::require("Merchant number", &input.number)?;

    let new_image = match image {
        Some(upload) => Some(storage.upload_file(upload, QRIS_FOLDER).await?),
        None => None,
    };

    let existing = get_qris_settings(db).await?;
    let old_image = existing.as_ref().and_then(|s| s.image.clone());

    let saved = match existing {
        Some(settings) => {
            let mut settings: qris_settings::ActiveModel = settings.into();
            settings.name = Set(input.name.trim().to_string());
            settings.number = Set(input.number.trim().to_string());
            if let Some(url) = &new_image {
                settings.image = Set(Some(url.clone()));
            }
            settings.update(db).await
        }
        None => {
            qris_settings::ActiveModel {
                image: Set(new_image.clone()),
                name: Set(input.name.trim().to_string()),
                number: Set(input.number.trim().to_string()),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await
        }
    };

    let saved = match saved {
        Ok(saved) => saved,
        Err(e) => {
            if let Some(url) = new_image {
                discard_image(storage, &url).await;
            }
            return Err(e.into());
        }
    };

    if let (Some(_), Some(old)) = (&new_image, old_image) {
        discard_image(storage, &old).await;
    }

    info!("Saved QRIS settings for '{}'", saved.name);
    Ok(saved)
}

async fn discard_image(storage: &Storage, url: &str) {
    if let Err(e) = storage.delete_file(url).await {
        warn!("Could not delete QRIS image {url}: {e}");
    }
}
