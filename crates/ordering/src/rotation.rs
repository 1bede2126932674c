//! Round-robin selection of outbound WhatsApp numbers.
//!
//! Orders are spread across several phone lines without a server-side
//! balancer. The numbers used in the current cycle are persisted, so the
//! spread holds across reloads: no number repeats until every number in
//! the pool has been picked once. Within a cycle the next number is the
//! first unused one in pool order.

use chapati_core::PhoneNumber;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::storage::{self, KeyValueStore, keys};

/// Errors building a contact pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactPoolError {
    /// The pool has no numbers.
    #[error("contact pool must contain at least one number")]
    Empty,

    /// A number appears more than once.
    #[error("contact pool lists {0} more than once")]
    Duplicate(PhoneNumber),
}

/// Fixed, ordered, non-empty set of outbound numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPool {
    numbers: Vec<PhoneNumber>,
}

impl ContactPool {
    /// Build a pool from distinct numbers.
    ///
    /// # Errors
    ///
    /// Returns `ContactPoolError` if `numbers` is empty or has duplicates.
    pub fn new(numbers: Vec<PhoneNumber>) -> Result<Self, ContactPoolError> {
        if numbers.is_empty() {
            return Err(ContactPoolError::Empty);
        }
        for (i, number) in numbers.iter().enumerate() {
            if numbers.iter().take(i).any(|earlier| earlier == number) {
                return Err(ContactPoolError::Duplicate(number.clone()));
            }
        }
        Ok(Self { numbers })
    }

    /// Numbers in pool order.
    #[must_use]
    pub fn numbers(&self) -> &[PhoneNumber] {
        &self.numbers
    }

    /// Pool size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Always false; a pool is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    #[allow(clippy::indexing_slicing)] // Non-empty by construction
    fn first(&self) -> &PhoneNumber {
        &self.numbers[0]
    }
}

/// Picks the next contact number and remembers recently used ones.
pub struct ContactRotation<S> {
    pool: ContactPool,
    used: Vec<PhoneNumber>,
    storage: S,
}

impl<S: KeyValueStore> ContactRotation<S> {
    /// Create a rotation, loading the used-number list from storage.
    ///
    /// Unreadable stored data starts a fresh cycle.
    pub fn new(pool: ContactPool, storage: S) -> Self {
        let used = match storage::load_json::<Vec<PhoneNumber>, _>(&storage, keys::USED_CONTACTS) {
            Ok(used) => used.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Stored contact rotation is unreadable, starting a new cycle");
                Vec::new()
            }
        };
        debug!(pool = pool.len(), used = used.len(), "Loaded contact rotation");
        Self {
            pool,
            used,
            storage,
        }
    }

    /// Select the next number to send an order to.
    ///
    /// 1. If the used list covers the pool size, a new cycle starts.
    /// 2. The first pool number not yet used is selected.
    /// 3. If none is available the used list is inconsistent with the pool;
    ///    the first pool number is selected and dropped from the used list.
    /// 4. The selection is recorded and persisted. A failed write is logged.
    pub fn pick_next(&mut self) -> PhoneNumber {
        if self.used.len() >= self.pool.len() {
            debug!("All contacts used, starting a new cycle");
            self.used.clear();
        }

        let selected = if let Some(number) = self
            .pool
            .numbers()
            .iter()
            .find(|number| !self.used.contains(number))
        {
            number.clone()
        } else {
            let first = self.pool.first().clone();
            warn!(contact = %first, "No unused contact available, repairing rotation state");
            self.used.retain(|number| number != &first);
            first
        };

        self.used.push(selected.clone());
        if let Err(e) = storage::save_json(&self.storage, keys::USED_CONTACTS, &self.used) {
            warn!(error = %e, "Failed to persist contact rotation");
        }

        info!(contact = %selected, used = self.used.len(), "Selected WhatsApp contact");
        selected
    }

    /// Numbers used in the current cycle, oldest first.
    #[must_use]
    pub fn used(&self) -> &[PhoneNumber] {
        &self.used
    }

    /// The configured pool.
    #[must_use]
    pub const fn pool(&self) -> &ContactPool {
        &self.pool
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn number(s: &str) -> PhoneNumber {
        PhoneNumber::parse(s).unwrap()
    }

    fn pool() -> ContactPool {
        ContactPool::new(vec![
            number("256700000001"),
            number("256700000002"),
            number("256700000003"),
            number("256700000004"),
        ])
        .unwrap()
    }

    #[test]
    fn test_pool_rejects_empty() {
        assert_eq!(ContactPool::new(vec![]), Err(ContactPoolError::Empty));
    }

    #[test]
    fn test_pool_rejects_duplicates() {
        let result = ContactPool::new(vec![number("256700000001"), number("+256 700 000 001")]);
        assert!(matches!(result, Err(ContactPoolError::Duplicate(_))));
    }

    #[test]
    fn test_round_robin_order() {
        let mut rotation = ContactRotation::new(pool(), MemoryStore::new());
        let picks: Vec<String> = (0..6)
            .map(|_| rotation.pick_next().into_inner())
            .collect();

        assert_eq!(
            picks,
            vec![
                "256700000001",
                "256700000002",
                "256700000003",
                "256700000004",
                "256700000001",
                "256700000002",
            ]
        );
    }

    #[test]
    fn test_cycle_resets_before_fifth_pick() {
        let mut rotation = ContactRotation::new(pool(), MemoryStore::new());
        for _ in 0..4 {
            rotation.pick_next();
        }
        assert_eq!(rotation.used().len(), 4);

        rotation.pick_next();
        assert_eq!(rotation.used(), &[number("256700000001")]);
    }

    #[test]
    fn test_rotation_survives_reload() {
        let storage = MemoryStore::new();
        let mut rotation = ContactRotation::new(pool(), storage.clone());
        rotation.pick_next();
        rotation.pick_next();

        let mut reloaded = ContactRotation::new(pool(), storage);
        assert_eq!(reloaded.pick_next(), number("256700000003"));
    }

    #[test]
    fn test_malformed_storage_starts_new_cycle() {
        let storage = MemoryStore::new();
        storage.set(keys::USED_CONTACTS, "oops".to_string()).unwrap();

        let mut rotation = ContactRotation::new(pool(), storage);
        assert!(rotation.used().is_empty());
        assert_eq!(rotation.pick_next(), number("256700000001"));
    }

    #[test]
    fn test_stale_numbers_count_toward_cycle() {
        let storage = MemoryStore::new();
        storage::save_json(
            &storage,
            keys::USED_CONTACTS,
            &vec![number("256799999999"), number("256700000001")],
        )
        .unwrap();

        let mut rotation = ContactRotation::new(pool(), storage);
        assert_eq!(rotation.pick_next(), number("256700000002"));
    }

    #[test]
    fn test_single_number_pool() {
        let single = ContactPool::new(vec![number("256700000001")]).unwrap();
        let mut rotation = ContactRotation::new(single, MemoryStore::new());
        assert_eq!(rotation.pick_next(), number("256700000001"));
        assert_eq!(rotation.pick_next(), number("256700000001"));
        assert_eq!(rotation.used().len(), 1);
    }
}
