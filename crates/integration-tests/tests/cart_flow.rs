//! Integration tests for the cart store.
//!
//! These tests drive `CartStore` through sequences of mutations and check
//! the totals, the persisted JSON, and what the renderer was handed.

use chapati_core::{CurrencyCode, DecrementPolicy, Price, ProductId};
use chapati_integration_tests::{RecordingRenderer, temp_path};
use chapati_ordering::cart::{CartStore, Decrement, ValidationError};
use chapati_ordering::storage::{JsonFileStore, KeyValueStore, MemoryStore, keys};

fn store(storage: MemoryStore) -> CartStore<MemoryStore, RecordingRenderer> {
    CartStore::hydrated(
        storage,
        RecordingRenderer::default(),
        CurrencyCode::UGX,
        DecrementPolicy::KeepAtOne,
    )
}

// =============================================================================
// Mutation Tests
// =============================================================================

#[test]
fn test_plain_chapati_added_twice() {
    let mut store = store(MemoryStore::new());
    store.add_item("x1", "Plain Chapati", "1500", "").unwrap();
    store.add_item("x1", "Plain Chapati", "1500", "").unwrap();

    let items = store.cart().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().unwrap().quantity, 2);
    assert_eq!(store.totals().total, Price::new(3000));
    assert_eq!(store.totals().item_count, 2);
}

#[test]
fn test_repeated_add_counts_calls() {
    let mut store = store(MemoryStore::new());
    for expected in 1..=7 {
        let quantity = store.add_item("x3", "Rolex", "3000", "").unwrap();
        assert_eq!(quantity, expected);
    }
    assert_eq!(store.cart().len(), 1);
}

#[test]
fn test_total_tracks_interleaved_mutations() {
    let mut store = store(MemoryStore::new());
    let plain = ProductId::new("x1");
    let rolex = ProductId::new("x2");

    store.add_item("x1", "Plain Chapati", "1500", "").unwrap();
    store.add_item("x2", "Rolex", "3000", "").unwrap();
    store.increment(&plain);
    store.increment(&rolex);
    store.increment(&rolex);
    store.decrement(&rolex);
    store.add_item("x4", "Chapati Wrap", "5000", "").unwrap();
    store.remove_item(&ProductId::new("x4"));

    let expected: u64 = store
        .cart()
        .items()
        .iter()
        .map(|item| item.unit_price.minor_units() * u64::from(item.quantity))
        .sum();
    assert_eq!(store.totals().total.minor_units(), expected);
    assert_eq!(expected, 2 * 1500 + 2 * 3000);
}

#[test]
fn test_remove_then_add_restarts_at_one() {
    let mut store = store(MemoryStore::new());
    let id = ProductId::new("x1");
    store.add_item("x1", "Plain Chapati", "1500", "").unwrap();
    store.increment(&id);
    assert!(store.remove_item(&id));

    assert_eq!(store.add_item("x1", "Plain Chapati", "1500", "").unwrap(), 1);
}

#[test]
fn test_decrement_policies() {
    let mut keep = store(MemoryStore::new());
    keep.add_item("x1", "Plain Chapati", "1500", "").unwrap();
    assert_eq!(keep.decrement(&ProductId::new("x1")), Decrement::Unchanged);
    assert_eq!(keep.cart().len(), 1);

    let mut remove = CartStore::hydrated(
        MemoryStore::new(),
        RecordingRenderer::default(),
        CurrencyCode::UGX,
        DecrementPolicy::RemoveAtZero,
    );
    remove.add_item("x1", "Plain Chapati", "1500", "").unwrap();
    assert_eq!(remove.decrement(&ProductId::new("x1")), Decrement::Removed);
    assert!(remove.cart().is_empty());
}

#[test]
fn test_invalid_products_rejected() {
    let mut store = store(MemoryStore::new());
    assert_eq!(
        store.add_item("", "Plain Chapati", "1500", ""),
        Err(ValidationError::MissingId)
    );
    assert!(matches!(
        store.add_item("x1", "  ", "1500", ""),
        Err(ValidationError::MissingName(_))
    ));
    assert!(matches!(
        store.add_item("x1", "Plain Chapati", "15.00", ""),
        Err(ValidationError::InvalidPrice { .. })
    ));
    assert!(store.cart().is_empty());
}

// =============================================================================
// Rendering Tests
// =============================================================================

#[test]
fn test_one_render_per_change() {
    let mut store = store(MemoryStore::new());
    assert_eq!(store.renderer().views.len(), 1, "hydration renders once");

    store.add_item("x1", "Plain Chapati", "1500", "").unwrap();
    store.increment(&ProductId::new("x1"));
    assert_eq!(store.renderer().views.len(), 3);

    store.remove_item(&ProductId::new("missing"));
    store.increment(&ProductId::new("missing"));
    assert_eq!(store.renderer().views.len(), 3, "no-ops do not render");

    let last = store.renderer().views.last().unwrap();
    assert_eq!(last.item_count, 2);
    assert_eq!(last.total, "3,000 UGX");
    assert!(last.checkout_enabled);
}

#[test]
fn test_empty_cart_disables_checkout() {
    let mut store = store(MemoryStore::new());
    store.add_item("x1", "Plain Chapati", "1500", "").unwrap();
    store.clear();

    let last = store.renderer().views.last().unwrap();
    assert!(last.is_empty());
    assert!(!last.checkout_enabled);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_stored_json_uses_page_format() {
    let storage = MemoryStore::new();
    let mut store = store(storage.clone());
    store
        .add_item("x1", "Plain Chapati", "1500", "/img/plain.jpg")
        .unwrap();

    let raw = storage.get(keys::CART).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "id": "x1",
            "name": "Plain Chapati",
            "price": 1500,
            "image": "/img/plain.jpg",
            "quantity": 1
        }])
    );
}

#[test]
fn test_hydrate_round_trip_preserves_order() {
    let storage = MemoryStore::new();
    let mut first = store(storage.clone());
    first.add_item("x2", "Rolex", "3000", "").unwrap();
    first.add_item("x1", "Plain Chapati", "1500", "").unwrap();
    first.add_item("x2", "Rolex", "3000", "").unwrap();

    let second = store(storage);
    assert_eq!(second.cart(), first.cart());
    let ids: Vec<&str> = second
        .cart()
        .items()
        .iter()
        .map(|item| item.id.as_str())
        .collect();
    assert_eq!(ids, ["x2", "x1"]);
}

#[test]
fn test_hydrate_drops_bad_entries() {
    let storage = MemoryStore::new();
    storage
        .set(
            keys::CART,
            r#"[
                {"id":"x1","name":"Plain Chapati","price":1500,"image":"","quantity":2},
                {"id":"x2","name":"Rolex","price":"oops","quantity":1},
                {"id":"x3","name":"Wrap","price":5000,"quantity":0},
                {"id":"x1","name":"Plain Chapati","price":1500,"quantity":1}
            ]"#
            .to_string(),
        )
        .unwrap();

    let store = store(storage);
    assert_eq!(store.cart().len(), 1);
    assert_eq!(store.totals().item_count, 3);
}

#[test]
fn test_malformed_cart_starts_empty() {
    let storage = MemoryStore::new();
    storage.set(keys::CART, "{not json".to_string()).unwrap();
    assert!(store(storage).cart().is_empty());
}

#[test]
fn test_failed_write_keeps_cart_in_memory() {
    let storage = MemoryStore::with_quota(16);
    let mut store = store(storage.clone());
    store.add_item("x1", "Plain Chapati", "1500", "").unwrap();

    assert_eq!(store.cart().len(), 1);
    assert!(storage.get(keys::CART).unwrap().is_none());
}

#[test]
fn test_file_store_survives_reopen() {
    let path = temp_path("storage.json");
    {
        let storage = JsonFileStore::open(path.clone()).unwrap();
        let mut store = CartStore::new(
            storage,
            RecordingRenderer::default(),
            CurrencyCode::UGX,
            DecrementPolicy::KeepAtOne,
        );
        store.add_item("x1", "Plain Chapati", "1500", "").unwrap();
        store.add_item("x1", "Plain Chapati", "1500", "").unwrap();
    }

    let storage = JsonFileStore::open(path.clone()).unwrap();
    let store = CartStore::hydrated(
        storage,
        RecordingRenderer::default(),
        CurrencyCode::UGX,
        DecrementPolicy::KeepAtOne,
    );
    assert_eq!(store.totals().total, Price::new(3000));

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}
