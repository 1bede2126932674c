//! Scenario tests for the PFG Chapati ordering flow.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p chapati-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart mutations, persistence, and rendering
//! - `contact_rotation` - Round-robin WhatsApp contact selection
//! - `checkout` - Checkout task, cancellation, and page effects
//! - `offline_cache` - Install, activate, and fetch fallbacks
//! - `order_page` - End-to-end page interactions
//!
//! This crate holds the shared fixtures.

use std::collections::HashMap;
use std::path::PathBuf;

use chapati_ordering::cart::{CartRenderer, CartView};
use chapati_ordering::notify::ToastSlot;
use chapati_ordering::storage::MemoryStore;
use chapati_ordering::{OrderPage, OrderingConfig};

/// Build a configuration from explicit variables, defaults for the rest.
///
/// # Panics
///
/// Panics if the variables do not form a valid configuration.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn config(vars: &[(&str, &str)]) -> OrderingConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    OrderingConfig::from_vars(|key| vars.get(key).cloned()).unwrap()
}

/// Renderer that keeps every view it was handed.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub views: Vec<CartView>,
}

impl CartRenderer for RecordingRenderer {
    fn render(&mut self, view: &CartView) {
        self.views.push(view.clone());
    }
}

/// A page over in-memory storage with toasts captured.
pub type TestPage = OrderPage<MemoryStore, RecordingRenderer, ToastSlot>;

/// Open a page over `storage`, returning it with its toast slot.
#[must_use]
pub fn open_page(
    vars: &[(&str, &str)],
    storage: &MemoryStore,
) -> (TestPage, ToastSlot) {
    let toasts = ToastSlot::new();
    let page = OrderPage::new(
        config(vars),
        storage.clone(),
        RecordingRenderer::default(),
        toasts.clone(),
    );
    (page, toasts)
}

/// A unique path under the system temp directory.
#[must_use]
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("chapati-it-{}", uuid::Uuid::new_v4()))
        .join(name)
}
