//! Command implementations.
//!
//! Every command loads configuration, opens the file-backed store, and
//! drives the same [`OrderPage`] the browser page uses.

pub mod assets;
pub mod cart;
pub mod checkout;
pub mod locate;
pub mod order;
pub mod profile;

use chapati_ordering::cart::HtmlCartRenderer;
use chapati_ordering::notify::TracingNotifier;
use chapati_ordering::storage::JsonFileStore;
use chapati_ordering::{OrderPage, OrderingConfig, OrderingError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Ordering operation failed.
    #[error(transparent)]
    Ordering(#[from] OrderingError),

    /// No cart item with the given ID.
    #[error("No item in the cart with id: {0}")]
    UnknownItem(String),
}

/// The page as seen from the terminal.
pub type CliPage = OrderPage<JsonFileStore, HtmlCartRenderer, TracingNotifier>;

/// Load configuration and open the page over the configured storage file.
pub fn open_page() -> chapati_ordering::Result<CliPage> {
    let config = OrderingConfig::from_env()?;
    let storage = JsonFileStore::open(config.storage_path.clone())?;
    tracing::debug!(path = %storage.path().display(), "Opened storage");
    Ok(OrderPage::new(
        config,
        storage,
        HtmlCartRenderer::new(),
        TracingNotifier,
    ))
}

/// Terminal output.
#[allow(clippy::print_stdout)]
pub fn print(text: impl std::fmt::Display) {
    println!("{text}");
}
