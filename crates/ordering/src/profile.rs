//! Customer form fields remembered between visits.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{self, KeyValueStore, StorageError, keys};

/// Free-text customer details from the order form.
///
/// Nothing is validated beyond the non-empty delivery address that
/// checkout requires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerProfile {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub instructions: String,
}

impl CustomerProfile {
    /// The delivery address with surrounding whitespace removed, if any.
    #[must_use]
    pub fn delivery_address(&self) -> Option<&str> {
        let address = self.address.trim();
        (!address.is_empty()).then_some(address)
    }
}

/// Field-level update for [`CustomerProfile`]; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub instructions: Option<String>,
}

/// Persisted customer profile.
pub struct ProfileStore<S> {
    profile: CustomerProfile,
    storage: S,
}

impl<S: KeyValueStore> ProfileStore<S> {
    /// Load the stored profile; unreadable data yields an empty profile.
    pub fn load(storage: S) -> Self {
        let profile =
            match storage::load_json::<CustomerProfile, _>(&storage, keys::CUSTOMER_PROFILE) {
                Ok(profile) => profile.unwrap_or_default(),
                Err(e) => {
                    warn!(error = %e, "Stored customer profile is unreadable, starting empty");
                    CustomerProfile::default()
                }
            };
        Self { profile, storage }
    }

    /// The current profile.
    #[must_use]
    pub const fn profile(&self) -> &CustomerProfile {
        &self.profile
    }

    /// Apply an update and persist.
    ///
    /// The in-memory profile is updated even if the write fails.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub fn update(&mut self, update: ProfileUpdate) -> Result<(), StorageError> {
        let ProfileUpdate {
            name,
            phone,
            email,
            address,
            instructions,
        } = update;

        let fields = [
            (&mut self.profile.name, name),
            (&mut self.profile.phone, phone),
            (&mut self.profile.email, email),
            (&mut self.profile.address, address),
            (&mut self.profile.instructions, instructions),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }

        debug!("Updated customer profile");
        storage::save_json(&self.storage, keys::CUSTOMER_PROFILE, &self.profile)
    }

    /// Set the delivery address and persist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub fn set_address(&mut self, address: impl Into<String>) -> Result<(), StorageError> {
        self.update(ProfileUpdate {
            address: Some(address.into()),
            ..ProfileUpdate::default()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_delivery_address_trims() {
        let mut profile = CustomerProfile::default();
        assert_eq!(profile.delivery_address(), None);

        profile.address = "   ".to_string();
        assert_eq!(profile.delivery_address(), None);

        profile.address = "  Busega, Kampala ".to_string();
        assert_eq!(profile.delivery_address(), Some("Busega, Kampala"));
    }

    #[test]
    fn test_update_only_touches_given_fields() {
        let storage = MemoryStore::new();
        let mut store = ProfileStore::load(storage.clone());
        store
            .update(ProfileUpdate {
                name: Some("Amina".to_string()),
                address: Some("Busega".to_string()),
                ..ProfileUpdate::default()
            })
            .unwrap();
        store
            .update(ProfileUpdate {
                phone: Some("0700 000 000".to_string()),
                ..ProfileUpdate::default()
            })
            .unwrap();

        let reloaded = ProfileStore::load(storage);
        assert_eq!(reloaded.profile().name, "Amina");
        assert_eq!(reloaded.profile().address, "Busega");
        assert_eq!(reloaded.profile().phone, "0700 000 000");
    }

    #[test]
    fn test_partial_stored_profile_fills_defaults() {
        let storage = MemoryStore::new();
        storage
            .set(keys::CUSTOMER_PROFILE, r#"{"name":"Amina"}"#.to_string())
            .unwrap();

        let store = ProfileStore::load(storage);
        assert_eq!(store.profile().name, "Amina");
        assert!(store.profile().address.is_empty());
    }

    #[test]
    fn test_malformed_profile_starts_empty() {
        let storage = MemoryStore::new();
        storage
            .set(keys::CUSTOMER_PROFILE, "[1,2]".to_string())
            .unwrap();

        let store = ProfileStore::load(storage);
        assert_eq!(store.profile(), &CustomerProfile::default());
    }
}
