//! Cart store: the cart plus persistence and rendering side effects.

use chapati_core::{CurrencyCode, DecrementPolicy, ProductId};
use tracing::{debug, info, warn};

use super::view::{CartRenderer, CartView, NullRenderer};
use super::{Cart, CartTotals, Decrement, LineItem, NewLineItem, ValidationError};
use crate::storage::{self, KeyValueStore, StorageError, keys};

/// Owns the cart and keeps storage and the view in step with it.
///
/// Every mutation that changes the cart is followed by exactly one render
/// and one storage write. Mutations that change nothing (removing an
/// unknown item, decrementing at 1 under [`DecrementPolicy::KeepAtOne`])
/// do neither. A failed write is logged and the in-memory cart is kept.
pub struct CartStore<S, R = NullRenderer> {
    cart: Cart,
    storage: S,
    renderer: R,
    currency: CurrencyCode,
    policy: DecrementPolicy,
}

impl<S: KeyValueStore, R: CartRenderer> CartStore<S, R> {
    /// Create a store with an empty cart, without reading storage.
    pub fn new(storage: S, renderer: R, currency: CurrencyCode, policy: DecrementPolicy) -> Self {
        Self {
            cart: Cart::new(),
            storage,
            renderer,
            currency,
            policy,
        }
    }

    /// Create a store from the persisted cart and render it once.
    pub fn hydrated(
        storage: S,
        renderer: R,
        currency: CurrencyCode,
        policy: DecrementPolicy,
    ) -> Self {
        let mut store = Self::new(storage, renderer, currency, policy);
        store.hydrate();
        store
    }

    /// Replace the in-memory cart with the persisted one.
    ///
    /// Malformed stored data yields an empty cart rather than an error.
    /// Individual entries that fail to parse are dropped; the rest are
    /// normalized by [`Cart::from_items`].
    pub fn hydrate(&mut self) {
        self.cart = match storage::load_json::<Vec<serde_json::Value>, _>(&self.storage, keys::CART)
        {
            Ok(Some(raw_items)) => {
                let stored = raw_items.len();
                let items: Vec<LineItem> = raw_items
                    .into_iter()
                    .filter_map(|raw| match serde_json::from_value(raw) {
                        Ok(item) => Some(item),
                        Err(e) => {
                            warn!(error = %e, "Dropping unreadable stored cart item");
                            None
                        }
                    })
                    .collect();
                let cart = Cart::from_items(items);
                debug!(stored, restored = cart.len(), "Hydrated cart");
                cart
            }
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Stored cart is unreadable, starting with an empty cart");
                Cart::new()
            }
        };
        self.render();
    }

    /// Write the cart to storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub fn persist(&self) -> Result<(), StorageError> {
        storage::save_json(&self.storage, keys::CART, &self.cart)
    }

    /// Validate raw product attributes and add one unit.
    ///
    /// Returns the item's new quantity.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the ID or name is blank or the price is
    /// not a non-negative integer. The cart is left untouched.
    pub fn add_item(
        &mut self,
        id: &str,
        name: &str,
        unit_price: &str,
        image: &str,
    ) -> Result<u32, ValidationError> {
        let item = NewLineItem::parse(id, name, unit_price, image)?;
        Ok(self.add(item))
    }

    /// Add one unit of an already-validated product.
    pub fn add(&mut self, item: NewLineItem) -> u32 {
        let id = item.id().clone();
        let quantity = self.cart.add(item);
        if quantity == 1 {
            info!(product = %id, "Added new item to cart");
        } else {
            info!(product = %id, quantity, "Increased item quantity");
        }
        self.commit();
        quantity
    }

    /// Raise an item's quantity by one.
    pub fn increment(&mut self, id: &ProductId) -> Option<u32> {
        let quantity = self.cart.increment(id)?;
        debug!(product = %id, quantity, "Incremented item");
        self.commit();
        Some(quantity)
    }

    /// Lower an item's quantity by one, applying the configured policy.
    pub fn decrement(&mut self, id: &ProductId) -> Decrement {
        let outcome = self.cart.decrement(id, self.policy);
        match outcome {
            Decrement::Lowered(quantity) => {
                debug!(product = %id, quantity, "Decremented item");
                self.commit();
            }
            Decrement::Removed => {
                info!(product = %id, "Removed item at quantity zero");
                self.commit();
            }
            Decrement::Unchanged | Decrement::NotFound => {}
        }
        outcome
    }

    /// Remove an item. Returns true if it was present.
    pub fn remove_item(&mut self, id: &ProductId) -> bool {
        let removed = self.cart.remove(id);
        if removed {
            info!(product = %id, "Removed item from cart");
            self.commit();
        }
        removed
    }

    /// Empty the cart. Returns true if it had items.
    pub fn clear(&mut self) -> bool {
        let cleared = self.cart.clear();
        if cleared {
            info!("Cleared cart");
            self.commit();
        }
        cleared
    }

    /// Item count and total of the live cart.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// A fresh display model of the current cart.
    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::new(&self.cart, self.currency)
    }

    /// Currency used for display.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// The view collaborator.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    fn render(&mut self) {
        let view = CartView::new(&self.cart, self.currency);
        self.renderer.render(&view);
    }

    fn commit(&mut self) {
        self.render();
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist cart, keeping in-memory state");
        }
    }
}
