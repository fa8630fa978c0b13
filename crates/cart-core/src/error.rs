//! Cart error types.

use thiserror::Error;

/// Errors that can occur in cart operations.
#[derive(Error, Debug)]
pub enum CartError {
    /// No line with this unique id is in the cart.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Quantity must be positive.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// An item lacks the attribute being totalled.
    #[error("Item {item} has no attribute '{attribute}'")]
    MissingAttribute { item: String, attribute: String },

    /// Arithmetic overflow while totalling.
    #[error("Arithmetic overflow in attribute total")]
    Overflow,

    /// Key-value store error.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid storage configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(feature = "storage")]
impl From<cart_db::DbError> for CartError {
    fn from(e: cart_db::DbError) -> Self {
        CartError::DatabaseError(e.to_string())
    }
}

impl From<cart_kv::CacheError> for CartError {
    fn from(e: cart_kv::CacheError) -> Self {
        CartError::CacheError(e.to_string())
    }
}

impl From<serde_json::Error> for CartError {
    fn from(e: serde_json::Error) -> Self {
        CartError::SerializationError(e.to_string())
    }
}
