//! Ordering configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `CHAPATI_BUSINESS_NAME` - Name in the order message header (default: PFG Chapati)
//! - `CHAPATI_CONTACT_NUMBERS` - Comma-separated WhatsApp numbers (default: 256703055329)
//! - `CHAPATI_CURRENCY` - Display currency (default: UGX)
//! - `CHAPATI_STORAGE_PATH` - JSON file backing local storage (default: .chapati/storage.json)
//! - `CHAPATI_CHECKOUT_DELAY_MS` - Simulated checkout processing time (default: 1500)
//! - `CHAPATI_DECREMENT_POLICY` - `keep` or `remove` at quantity 1 (default: keep)
//! - `CHAPATI_LOCATION_HINT` - Landmark appended to detected coordinates
//! - `CHAPATI_GEOLOCATION_URL` - IP geolocation endpoint (default: <https://ipapi.co/json/>)
//! - `CHAPATI_GEOLOCATION_TIMEOUT_SECS` - Lookup timeout (default: 10)
//! - `CHAPATI_SITE_URL` - Origin the page is served from (default: <http://localhost:8080/>)
//! - `CHAPATI_CACHE_NAME` - Versioned offline cache name (default: pfg-chapati-v1.3)
//! - `CHAPATI_OFFLINE_PAGE` - Offline fallback page (default: /offline.html)
//! - `CHAPATI_PLACEHOLDER_IMAGE` - Image served when an image fails offline
//! - `CHAPATI_PRECACHE` - Comma-separated assets cached at install

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chapati_core::{CurrencyCode, DecrementPolicy, PhoneNumber};
use thiserror::Error;
use url::Url;

use crate::message::MessageOptions;
use crate::offline::OfflineSettings;
use crate::rotation::ContactPool;

const DEFAULT_CONTACT_NUMBERS: &str = "256703055329";
const DEFAULT_PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1586190848861-99aa4a171e90?w=400&h=300&fit=crop";
const DEFAULT_PRECACHE: &[&str] = &[
    "/",
    "/index.html",
    "/style.css",
    "/script.js",
    "/offline.html",
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
    DEFAULT_PLACEHOLDER_IMAGE,
    "https://images.unsplash.com/photo-1565299507177-b0ac66763828?w=400&h=300&fit=crop",
    "https://images.unsplash.com/photo-1571091718767-18b5b1457add?w=400&h=300&fit=crop",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Ordering page configuration.
#[derive(Debug, Clone)]
pub struct OrderingConfig {
    /// Shown in the order message header
    pub business_name: String,
    /// Outbound WhatsApp numbers in rotation order
    pub contacts: ContactPool,
    /// Display currency for prices
    pub currency: CurrencyCode,
    /// File backing the key-value store
    pub storage_path: PathBuf,
    /// Simulated checkout processing time
    pub checkout_delay: Duration,
    /// What decrementing at quantity 1 does
    pub decrement_policy: DecrementPolicy,
    /// Location detection settings
    pub location: LocationConfig,
    /// Offline cache settings
    pub offline: OfflineSettings,
}

/// Location detection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationConfig {
    /// Landmark appended to detected coordinates
    pub hint: Option<String>,
    /// IP geolocation endpoint
    pub endpoint: String,
    /// Lookup timeout
    pub timeout: Duration,
}

impl OrderingConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup function.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let business_name = env.get_or_default("CHAPATI_BUSINESS_NAME", "PFG Chapati");
        let contacts = parse_contacts(
            "CHAPATI_CONTACT_NUMBERS",
            &env.get_or_default("CHAPATI_CONTACT_NUMBERS", DEFAULT_CONTACT_NUMBERS),
        )?;
        let currency = env.parse_or_default("CHAPATI_CURRENCY", CurrencyCode::UGX)?;
        let storage_path = PathBuf::from(
            env.get_or_default("CHAPATI_STORAGE_PATH", ".chapati/storage.json"),
        );
        let checkout_delay = Duration::from_millis(
            env.parse_or_default("CHAPATI_CHECKOUT_DELAY_MS", 1500_u64)?,
        );
        let decrement_policy =
            env.parse_or_default("CHAPATI_DECREMENT_POLICY", DecrementPolicy::KeepAtOne)?;

        let location = LocationConfig {
            hint: env.get_optional("CHAPATI_LOCATION_HINT"),
            endpoint: env.get_or_default("CHAPATI_GEOLOCATION_URL", "https://ipapi.co/json/"),
            timeout: Duration::from_secs(
                env.parse_or_default("CHAPATI_GEOLOCATION_TIMEOUT_SECS", 10_u64)?,
            ),
        };

        let site_url = env.get_or_default("CHAPATI_SITE_URL", "http://localhost:8080/");
        let site_url = Url::parse(&site_url).map_err(|e| {
            ConfigError::InvalidEnvVar("CHAPATI_SITE_URL".to_string(), e.to_string())
        })?;
        let precache = env.get_optional("CHAPATI_PRECACHE").map_or_else(
            || DEFAULT_PRECACHE.iter().map(ToString::to_string).collect(),
            |value| split_list(&value),
        );
        let offline = OfflineSettings {
            cache_name: env.get_or_default("CHAPATI_CACHE_NAME", "pfg-chapati-v1.3"),
            site_url,
            offline_page: env.get_or_default("CHAPATI_OFFLINE_PAGE", "/offline.html"),
            placeholder_image: env
                .get_or_default("CHAPATI_PLACEHOLDER_IMAGE", DEFAULT_PLACEHOLDER_IMAGE),
            precache,
        };

        Ok(Self {
            business_name,
            contacts,
            currency,
            storage_path,
            checkout_delay,
            decrement_policy,
            location,
            offline,
        })
    }

    /// Options for the order message formatter.
    #[must_use]
    pub fn message_options(&self) -> MessageOptions {
        MessageOptions {
            business_name: self.business_name.clone(),
            currency: self.currency,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; blank values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or_default<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_optional(key).map_or(Ok(default), |value| {
            value
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_contacts(key: &str, value: &str) -> Result<ContactPool, ConfigError> {
    let invalid = |e: String| ConfigError::InvalidEnvVar(key.to_string(), e);
    let numbers = split_list(value)
        .iter()
        .map(|number| PhoneNumber::parse(number).map_err(|e| invalid(e.to_string())))
        .collect::<Result<Vec<_>, _>>()?;
    ContactPool::new(numbers).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<OrderingConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        OrderingConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.business_name, "PFG Chapati");
        assert_eq!(config.contacts.numbers().len(), 1);
        assert_eq!(
            config.contacts.numbers().first().unwrap().as_str(),
            "256703055329"
        );
        assert_eq!(config.currency, CurrencyCode::UGX);
        assert_eq!(config.checkout_delay, Duration::from_millis(1500));
        assert_eq!(config.decrement_policy, DecrementPolicy::KeepAtOne);
        assert_eq!(config.location.timeout, Duration::from_secs(10));
        assert!(config.location.hint.is_none());
        assert_eq!(config.offline.cache_name, "pfg-chapati-v1.3");
        assert_eq!(config.offline.precache.len(), DEFAULT_PRECACHE.len());
    }

    #[test]
    fn test_contact_list() {
        let config = config(&[(
            "CHAPATI_CONTACT_NUMBERS",
            "+256 700 000 001, 256700000002,,256700000003",
        )])
        .unwrap();
        let numbers: Vec<&str> = config
            .contacts
            .numbers()
            .iter()
            .map(PhoneNumber::as_str)
            .collect();
        assert_eq!(numbers, ["256700000001", "256700000002", "256700000003"]);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        for (key, value) in [
            ("CHAPATI_CONTACT_NUMBERS", "not-a-number"),
            ("CHAPATI_CONTACT_NUMBERS", "256700000001,256700000001"),
            ("CHAPATI_CURRENCY", "EUR"),
            ("CHAPATI_CHECKOUT_DELAY_MS", "soon"),
            ("CHAPATI_DECREMENT_POLICY", "sometimes"),
            ("CHAPATI_SITE_URL", "not a url"),
        ] {
            let result = config(&[(key, value)]);
            assert!(
                matches!(&result, Err(ConfigError::InvalidEnvVar(k, _)) if k == key),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config(&[("CHAPATI_BUSINESS_NAME", "  "), ("CHAPATI_LOCATION_HINT", "")])
            .unwrap();
        assert_eq!(config.business_name, "PFG Chapati");
        assert!(config.location.hint.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("CHAPATI_DECREMENT_POLICY", "remove"),
            ("CHAPATI_LOCATION_HINT", "Near Busega Market"),
            ("CHAPATI_PRECACHE", "/, /offline.html"),
        ])
        .unwrap();
        assert_eq!(config.decrement_policy, DecrementPolicy::RemoveAtZero);
        assert_eq!(config.location.hint.as_deref(), Some("Near Busega Market"));
        assert_eq!(config.offline.precache, vec!["/", "/offline.html"]);
    }
}
