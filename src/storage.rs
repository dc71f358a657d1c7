//! Blob storage for product photos, payment proofs and QRIS images.
//!
//! Files live in a bucket directory on disk and are published under
//! `<PUBLIC_URL>/storage/<bucket>/`. Callers only ever see public URLs; the
//! mapping back to a path is done here.

use crate::config::AppConfig;
use crate::errors::{Error, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Folder for product photos
pub const PRODUCTS_FOLDER: &str = "products";
/// Folder for customer payment proofs
pub const PAYMENTS_FOLDER: &str = "payments";
/// Folder for QRIS images
pub const QRIS_FOLDER: &str = "qris";

/// Route prefix under which the storage root is served
pub const PUBLIC_PREFIX: &str = "/storage";

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// An uploaded file as received from a multipart form
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original file name, used only for its extension
    pub file_name: String,
    /// Raw content
    pub bytes: Vec<u8>,
}

/// A bucket directory with a public URL base
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    bucket: String,
    public_base: String,
}

impl Storage {
    /// Creates a storage rooted at `root` serving `bucket` under `public_url`.
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>, public_url: &str) -> Self {
        let bucket = bucket.into();
        let public_base = format!(
            "{}{PUBLIC_PREFIX}/{bucket}",
            public_url.trim_end_matches('/')
        );
        Self {
            root: root.into(),
            bucket,
            public_base,
        }
    }

    /// Builds the storage described by the application configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.storage_dir.clone(),
            config.storage_bucket.clone(),
            &config.public_url,
        )
    }

    /// Directory served under [`PUBLIC_PREFIX`].
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL prefix of every blob in the bucket, without trailing slash.
    #[must_use]
    pub fn public_base(&self) -> &str {
        &self.public_base
    }

    fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    /// Stores `upload` as `<folder>/<uuid>.<ext>` and returns its public URL.
    ///
    /// # Errors
    /// Returns `Error::Storage` for empty files, unsupported extensions or an
    /// invalid folder name, and `Error::Io` if the file cannot be written.
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name))]
    pub async fn upload_file(&self, upload: &Upload, folder: &str) -> Result<String> {
        if upload.bytes.is_empty() {
            return Err(Error::Storage {
                message: "Uploaded file is empty".to_string(),
            });
        }
        if folder.is_empty() || folder.contains(['/', '\\', '.']) {
            return Err(Error::Storage {
                message: format!("Invalid storage folder '{folder}'"),
            });
        }

        let extension = image_extension(&upload.file_name)?;
        let relative = format!("{folder}/{}.{extension}", Uuid::new_v4());
        let path = self.bucket_dir().join(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &upload.bytes).await?;

        let url = format!("{}/{relative}", self.public_base);
        info!("Stored {} bytes at {}", upload.bytes.len(), path.display());
        Ok(url)
    }

    /// Deletes the blob behind `public_url`.
    ///
    /// Returns `Ok(false)` if the URL does not point into this bucket or the
    /// file is already gone.
    #[instrument(skip(self))]
    pub async fn delete_file(&self, public_url: &str) -> Result<bool> {
        let Some(path) = self.path_for_url(public_url) else {
            warn!("delete_file: URL is not part of this bucket: {public_url}");
            return Ok(false);
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("delete_file: {} does not exist", path.display());
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Maps a public URL back to its file path inside the bucket.
    #[must_use]
    pub fn path_for_url(&self, public_url: &str) -> Option<PathBuf> {
        let relative = public_url
            .strip_prefix(&self.public_base)?
            .strip_prefix('/')?;
        let relative = Path::new(relative);

        let mut components = relative.components();
        let only_normal = components.all(|c| matches!(c, Component::Normal(_)));
        if relative.as_os_str().is_empty() || !only_normal {
            return None;
        }
        Some(self.bucket_dir().join(relative))
    }
}

fn image_extension(file_name: &str) -> Result<String> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(Error::Storage {
            message: format!(
                "Unsupported file type for '{file_name}', expected one of {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
        })
    }
}
