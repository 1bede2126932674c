//! Cart display model and renderers.
//!
//! The store hands a fresh [`CartView`] to its renderer after every
//! change. Renderers never read the cart themselves, so totals on screen
//! always come from the live list.

use askama::Template;
use chapati_core::CurrencyCode;
use tracing::{debug, error};

use super::{Cart, LineItem};

/// Line item display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
    /// Checkout and WhatsApp buttons are disabled for an empty cart.
    pub checkout_enabled: bool,
}

impl CartView {
    /// Build the display model for `cart`.
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        let totals = cart.totals();
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView::new(item, currency))
                .collect(),
            total: totals.total.display(currency),
            item_count: totals.item_count,
            checkout_enabled: !cart.is_empty(),
        }
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl CartItemView {
    fn new(item: &LineItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            price: item.unit_price.display(currency),
            line_price: item.subtotal().display(currency),
        }
    }
}

/// Receives the cart's display model after every change.
pub trait CartRenderer {
    /// Redraw the cart.
    fn render(&mut self, view: &CartView);
}

/// Renderer that discards updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl CartRenderer for NullRenderer {
    fn render(&mut self, _view: &CartView) {}
}

/// Cart items fragment template.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
struct CartItemsTemplate<'a> {
    cart: &'a CartView,
}

/// Cart count badge fragment template.
#[derive(Template)]
#[template(path = "partials/cart_count.html")]
struct CartCountTemplate {
    count: u32,
}

/// Renders the sidebar item list and count badge as HTML fragments.
#[derive(Debug, Clone, Default)]
pub struct HtmlCartRenderer {
    items_html: String,
    count_html: String,
    renders: usize,
}

impl HtmlCartRenderer {
    /// Create a renderer with nothing rendered yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last rendered item list fragment.
    #[must_use]
    pub fn items_html(&self) -> &str {
        &self.items_html
    }

    /// Last rendered count badge fragment.
    #[must_use]
    pub fn count_html(&self) -> &str {
        &self.count_html
    }

    /// Number of renders performed.
    #[must_use]
    pub const fn render_count(&self) -> usize {
        self.renders
    }
}

impl CartRenderer for HtmlCartRenderer {
    fn render(&mut self, view: &CartView) {
        self.renders += 1;

        match (CartItemsTemplate { cart: view }).render() {
            Ok(html) => self.items_html = html,
            Err(e) => error!(error = %e, "Failed to render cart items"),
        }

        match (CartCountTemplate {
            count: view.item_count,
        })
        .render()
        {
            Ok(html) => self.count_html = html,
            Err(e) => error!(error = %e, "Failed to render cart count"),
        }

        debug!(
            items = view.items.len(),
            count = view.item_count,
            "Rendered cart"
        );
    }
}
