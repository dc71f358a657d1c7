//! Multipart form parsing for the upload endpoints.

use crate::{
    errors::{Error, Result},
    storage::Upload,
};
use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use std::{collections::HashMap, str::FromStr};

/// Text fields and at most one file of a multipart form
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    /// The uploaded file, if the form carried a non-empty one
    pub file: Option<Upload>,
}

impl FormData {
    /// Reads the whole form. The part named `file_field` becomes [`FormData::file`].
    pub async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == file_field {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.file = Some(Upload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    /// A text field, if present.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// A required text field.
    pub fn required(&self, name: &str) -> Result<String> {
        self.text(name)
            .map(str::to_string)
            .ok_or_else(|| Error::validation(format!("Missing form field '{name}'")))
    }

    /// An optional text field, blank treated as absent.
    #[must_use]
    pub fn optional(&self, name: &str) -> Option<String> {
        self.text(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Parses a required field.
    pub fn parse<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.required(name)?;
        raw.trim()
            .parse()
            .map_err(|e| Error::validation(format!("Invalid value for '{name}': {e}")))
    }

    /// Parses an optional field.
    pub fn parse_optional<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(name)
            .map(|raw| {
                raw.parse()
                    .map_err(|e| Error::validation(format!("Invalid value for '{name}': {e}")))
            })
            .transpose()
    }

    /// Deserializes a field holding a JSON document.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let raw = self.required(name)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::validation(format!("Invalid JSON in '{name}': {e}")))
    }
}
