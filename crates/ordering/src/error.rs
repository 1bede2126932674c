//! Unified error handling.
//!
//! Each concern has its own error enum; `OrderingError` wraps them for
//! callers that handle several at once. Use [`OrderingError::user_message`]
//! for anything shown to the customer.

use chapati_core::{PhoneNumberError, PriceError};
use thiserror::Error;

use crate::cart::ValidationError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::geolocation::GeolocationError;
use crate::offline::FetchError;
use crate::rotation::ContactPoolError;
use crate::storage::StorageError;

/// Ordering-level error type.
#[derive(Debug, Error)]
pub enum OrderingError {
    /// Product attributes were rejected.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Local storage read or write failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Location detection failed.
    #[error("Geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),

    /// Asset could not be loaded.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Checkout could not complete.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Contact pool is invalid.
    #[error("Contact pool error: {0}")]
    ContactPool(#[from] ContactPoolError),

    /// A phone number failed to parse.
    #[error("Phone number error: {0}")]
    PhoneNumber(#[from] PhoneNumberError),

    /// A price failed to parse.
    #[error("Price error: {0}")]
    Price(#[from] PriceError),

    /// A link could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl OrderingError {
    /// Message safe to show the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        // Don't expose internal error details to customers
        match self {
            Self::Validation(_) | Self::Price(_) => {
                "Sorry, this item could not be added to your cart.".to_string()
            }
            Self::Storage(_) => "Your cart could not be saved on this device.".to_string(),
            Self::Geolocation(err) => err.user_message(),
            Self::Fetch(_) => "You appear to be offline.".to_string(),
            Self::Checkout(err) => err.user_message().to_string(),
            Self::Config(_) | Self::ContactPool(_) | Self::PhoneNumber(_) | Self::Url(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Result type alias for `OrderingError`.
pub type Result<T> = std::result::Result<T, OrderingError>;
