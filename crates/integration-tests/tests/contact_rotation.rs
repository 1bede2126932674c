//! Integration tests for WhatsApp contact rotation.
//!
//! These tests check the round-robin guarantees across picks, reloads,
//! and shared storage.

use std::collections::HashSet;

use chapati_core::PhoneNumber;
use chapati_ordering::rotation::{ContactPool, ContactRotation};
use chapati_ordering::storage::{KeyValueStore, MemoryStore, keys};

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

// =============================================================================
// Cycle Tests
// =============================================================================

#[test]
fn test_pool_sized_run_is_a_permutation() {
    let mut rotation = ContactRotation::new(pool(), MemoryStore::new());
    let picks: HashSet<PhoneNumber> = (0..4).map(|_| rotation.pick_next()).collect();
    assert_eq!(picks.len(), 4);

    // The next pick opens a new cycle
    assert_eq!(rotation.pick_next(), number("256700000001"));
    assert_eq!(rotation.used().len(), 1);
}

#[test]
fn test_sequence_a_b_c_d_a_b() {
    let mut rotation = ContactRotation::new(pool(), MemoryStore::new());
    let picks: Vec<PhoneNumber> = (0..6).map(|_| rotation.pick_next()).collect();
    let expected: Vec<PhoneNumber> = [1, 2, 3, 4, 1, 2]
        .iter()
        .map(|n| number(&format!("25670000000{n}")))
        .collect();
    assert_eq!(picks, expected);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_rotation_continues_after_reload() {
    let storage = MemoryStore::new();
    for expected in ["256700000001", "256700000002", "256700000003"] {
        let mut rotation = ContactRotation::new(pool(), storage.clone());
        assert_eq!(rotation.pick_next(), number(expected));
    }

    let raw = storage.get(keys::USED_CONTACTS).unwrap().unwrap();
    let stored: Vec<String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, ["256700000001", "256700000002", "256700000003"]);
}

#[test]
fn test_pool_change_between_visits() {
    let storage = MemoryStore::new();
    let mut rotation = ContactRotation::new(pool(), storage.clone());
    rotation.pick_next();
    rotation.pick_next();

    // The shop drops to two numbers; both are already used, so the next
    // visit starts a new cycle.
    let smaller =
        ContactPool::new(vec![number("256700000001"), number("256700000002")]).unwrap();
    let mut rotation = ContactRotation::new(smaller, storage);
    assert_eq!(rotation.pick_next(), number("256700000001"));
}

#[test]
fn test_used_list_longer_than_pool_starts_new_cycle() {
    let storage = MemoryStore::new();
    storage
        .set(
            keys::USED_CONTACTS,
            r#"["256799999999","256799999998","256700000001"]"#.to_string(),
        )
        .unwrap();

    let small = ContactPool::new(vec![number("256700000001")]).unwrap();
    let mut rotation = ContactRotation::new(small, storage);
    assert_eq!(rotation.pick_next(), number("256700000001"));
}
