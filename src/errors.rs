//! Unified error type for the bakery shop.
//!
//! Every fallible operation in the crate returns [`Result`]. The HTTP layer maps
//! each variant onto a status code in `api::error`.

use crate::entities::order::OrderStatus;
use thiserror::Error;

/// All errors produced by the service, storage and configuration layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Any failure reported by the database driver
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure (blob storage, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Password hashing or verification could not run
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// What went wrong
        message: String,
    },

    /// Form input rejected before reaching the database
    #[error("Validation error: {message}")]
    Validation {
        /// Human readable reason, suitable for showing to the user
        message: String,
    },

    /// A record that was looked up by id does not exist
    #[error("{entity} with ID {id} not found")]
    NotFound {
        /// Kind of record ("Order", "Product", ...)
        entity: &'static str,
        /// The id that was requested
        id: i64,
    },

    /// Another account already uses this email address
    #[error("A user with email '{email}' already exists")]
    EmailTaken {
        /// The conflicting address
        email: String,
    },

    /// Email/password pair did not match any account
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Request carried no valid session
    #[error("Authentication required")]
    Unauthorized,

    /// Session is valid but lacks the required role or ownership
    #[error("You do not have access to this resource")]
    Forbidden,

    /// Requested status change does not follow the order lifecycle
    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// Client supplied an order total that differs from the sum of its lines
    #[error("Order total {submitted} does not match the sum of its items ({computed})")]
    TotalMismatch {
        /// Total sent by the client
        submitted: i64,
        /// Σ quantity × price of the submitted lines
        computed: i64,
    },

    /// Chosen shipping method cannot carry the cart
    #[error("Shipping method '{method}' is not available for this cart")]
    ShippingUnavailable {
        /// Identifier of the rejected method
        method: String,
    },

    /// Blob storage rejected an upload or could not resolve a URL
    #[error("Storage error: {message}")]
    Storage {
        /// What went wrong
        message: String,
    },
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(value: bcrypt::BcryptError) -> Self {
        Self::PasswordHash {
            message: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::Config {
            message: format!("Failed to parse TOML: {value}"),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
