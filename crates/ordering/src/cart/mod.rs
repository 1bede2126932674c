//! Cart model, store, and rendering.
//!
//! - [`Cart`] is the plain ordered list of [`LineItem`]s with the
//!   quantity and uniqueness invariants.
//! - [`CartStore`] owns a cart, persists it after every change, and hands
//!   the new state to a [`CartRenderer`].
//! - [`CartView`] is the display model the renderers consume.

mod store;
mod view;

pub use store::CartStore;
pub use view::{CartItemView, CartRenderer, CartView, HtmlCartRenderer, NullRenderer};

use chapati_core::{DecrementPolicy, Price, PriceError, ProductId};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Why a product could not be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The add-to-cart button had no product ID.
    #[error("product is missing an id")]
    MissingId,

    /// The add-to-cart button had no product name.
    #[error("product {0} is missing a name")]
    MissingName(ProductId),

    /// The price attribute was not a non-negative integer.
    #[error("product {id} has an invalid price: {source}")]
    InvalidPrice {
        /// Product whose price was rejected.
        id: ProductId,
        /// Underlying parse failure.
        source: PriceError,
    },
}

/// One product entry in the cart with its own quantity.
///
/// Field names on the wire match the page's stored cart format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Price,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
    pub quantity: u32,
}

/// Deserialize `null` as an empty string. Items added from buttons without
/// an image were stored with `"image": null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.unwrap_or_default())
}

impl LineItem {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A validated product ready to be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    id: ProductId,
    name: String,
    unit_price: Price,
    image: String,
}

impl NewLineItem {
    /// Validate raw add-to-cart attributes.
    ///
    /// `id` and `name` must be non-blank and `unit_price` must parse as a
    /// non-negative integer. The image URI is taken as-is.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn parse(
        id: &str,
        name: &str,
        unit_price: &str,
        image: &str,
    ) -> Result<Self, ValidationError> {
        let id = ProductId::new(id.trim());
        if id.is_blank() {
            return Err(ValidationError::MissingId);
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName(id));
        }

        let unit_price = Price::parse(unit_price)
            .map_err(|source| ValidationError::InvalidPrice { id: id.clone(), source })?;

        Ok(Self {
            id,
            name: name.to_owned(),
            unit_price,
            image: image.trim().to_owned(),
        })
    }

    /// Build from already-typed values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `id` or `name` is blank.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        unit_price: Price,
        image: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if id.is_blank() {
            return Err(ValidationError::MissingId);
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::MissingName(id));
        }
        Ok(Self {
            id,
            name,
            unit_price,
            image: image.into(),
        })
    }

    /// The product ID.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.id
    }

    /// The product name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Item count and total, always computed from the live list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of quantities.
    pub item_count: u32,
    /// Sum of `unit_price * quantity`.
    pub total: Price,
}

/// Result of decrementing a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// Quantity lowered to the contained value.
    Lowered(u32),
    /// Item was at quantity 1 and has been removed.
    Removed,
    /// Item was at quantity 1 and policy kept it there.
    Unchanged,
    /// No item with that ID.
    NotFound,
}

/// Ordered list of line items, unique by product ID.
///
/// Insertion order is preserved for display. Every item has quantity >= 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from stored items, restoring the invariants.
    ///
    /// Items with quantity 0 or a blank ID are dropped; repeated IDs are
    /// merged into the first occurrence.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity == 0 || item.id.is_blank() {
                continue;
            }
            match cart.position(&item.id) {
                Some(index) => {
                    if let Some(existing) = cart.items.get_mut(index) {
                        existing.quantity = existing.quantity.saturating_add(item.quantity);
                    }
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line item by product ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item count and total, recomputed on every call.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            item_count: self
                .items
                .iter()
                .fold(0_u32, |count, item| count.saturating_add(item.quantity)),
            total: self.items.iter().map(LineItem::subtotal).sum(),
        }
    }

    /// Add one unit of a product, appending it if new.
    ///
    /// Returns the item's quantity after the add.
    pub fn add(&mut self, item: NewLineItem) -> u32 {
        if let Some(existing) = self.items.iter_mut().find(|line| line.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(1);
            return existing.quantity;
        }

        self.items.push(LineItem {
            id: item.id,
            name: item.name,
            unit_price: item.unit_price,
            image: item.image,
            quantity: 1,
        });
        1
    }

    /// Raise an item's quantity by one.
    ///
    /// Returns the new quantity, or `None` if the item is not in the cart.
    pub fn increment(&mut self, id: &ProductId) -> Option<u32> {
        let item = self.items.iter_mut().find(|item| &item.id == id)?;
        item.quantity = item.quantity.saturating_add(1);
        Some(item.quantity)
    }

    /// Lower an item's quantity by one, applying `policy` at quantity 1.
    pub fn decrement(&mut self, id: &ProductId, policy: DecrementPolicy) -> Decrement {
        let Some(index) = self.position(id) else {
            return Decrement::NotFound;
        };
        let Some(item) = self.items.get_mut(index) else {
            return Decrement::NotFound;
        };

        if item.quantity > 1 {
            item.quantity -= 1;
            return Decrement::Lowered(item.quantity);
        }

        match policy {
            DecrementPolicy::KeepAtOne => Decrement::Unchanged,
            DecrementPolicy::RemoveAtZero => {
                self.items.remove(index);
                Decrement::Removed
            }
        }
    }

    /// Remove an item. Returns true if it was present.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Remove every item. Returns true if the cart was non-empty.
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }
}
