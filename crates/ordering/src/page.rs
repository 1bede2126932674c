//! The ordering page controller.
//!
//! `OrderPage` owns every piece of page state and exposes one handler per
//! user interaction. Handlers report to the customer through the
//! [`Notifier`] and never fail outward for problems the page recovers from.

use chapati_core::{OrderButton, ProductId};
use tracing::{info, instrument, warn};
use url::Url;

use crate::cart::{CartRenderer, CartStore, Decrement, NullRenderer, ValidationError};
use crate::checkout::{
    CheckoutError, CheckoutRequest, OrderConfirmation, PendingCheckout, ProcessingFlag,
};
use crate::config::OrderingConfig;
use crate::geolocation::{GeolocationError, LocationProvider};
use crate::message::{format_order_message, whatsapp_url};
use crate::notify::{Notifier, Toast, TracingNotifier};
use crate::profile::{CustomerProfile, ProfileStore, ProfileUpdate};
use crate::rotation::ContactRotation;
use crate::sidebar::{Sidebar, SidebarEvent};
use crate::storage::KeyValueStore;

/// Page state and interaction handlers.
pub struct OrderPage<S, R = NullRenderer, N = TracingNotifier> {
    config: OrderingConfig,
    cart: CartStore<S, R>,
    rotation: ContactRotation<S>,
    profile: ProfileStore<S>,
    sidebar: Sidebar,
    notifier: N,
    processing: ProcessingFlag,
}

impl<S, R, N> OrderPage<S, R, N>
where
    S: KeyValueStore + Clone,
    R: CartRenderer,
    N: Notifier,
{
    /// Load page state from `storage` and render the cart once.
    pub fn new(config: OrderingConfig, storage: S, renderer: R, notifier: N) -> Self {
        let cart = CartStore::hydrated(
            storage.clone(),
            renderer,
            config.currency,
            config.decrement_policy,
        );
        let rotation = ContactRotation::new(config.contacts.clone(), storage.clone());
        let profile = ProfileStore::load(storage);

        Self {
            config,
            cart,
            rotation,
            profile,
            sidebar: Sidebar::new(),
            notifier,
            processing: ProcessingFlag::new(),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub const fn config(&self) -> &OrderingConfig {
        &self.config
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub const fn cart(&self) -> &CartStore<S, R> {
        &self.cart
    }

    /// Get a reference to the saved customer profile.
    #[must_use]
    pub const fn profile(&self) -> &CustomerProfile {
        self.profile.profile()
    }

    /// Get a reference to the contact rotation.
    #[must_use]
    pub const fn rotation(&self) -> &ContactRotation<S> {
        &self.rotation
    }

    /// Get the sidebar state.
    #[must_use]
    pub const fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    /// Get a reference to the notifier.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Whether a checkout is in progress.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing.is_active()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add-to-cart button pressed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the product attributes are invalid; the
    /// cart is unchanged and an error toast is shown.
    pub fn add_to_cart(
        &mut self,
        id: &str,
        name: &str,
        unit_price: &str,
        image: &str,
    ) -> Result<u32, ValidationError> {
        match self.cart.add_item(id, name, unit_price, image) {
            Ok(quantity) => {
                self.sidebar.handle(SidebarEvent::ItemAdded);
                self.notifier
                    .notify(Toast::success(format!("{} added to cart!", name.trim())));
                Ok(quantity)
            }
            Err(e) => {
                warn!(error = %e, "Rejected add-to-cart");
                self.notifier.notify(Toast::error(
                    "Sorry, this item could not be added to your cart.",
                ));
                Err(e)
            }
        }
    }

    /// Quantity "+" pressed.
    pub fn increase(&mut self, id: &ProductId) -> Option<u32> {
        self.cart.increment(id)
    }

    /// Quantity "-" pressed.
    pub fn decrease(&mut self, id: &ProductId) -> Decrement {
        self.cart.decrement(id)
    }

    /// Remove button pressed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        self.cart.remove_item(id)
    }

    /// Empty the cart. Returns true if it had items.
    pub fn clear_cart(&mut self) -> bool {
        self.cart.clear()
    }

    /// Sidebar interaction. Returns true if the sidebar changed.
    pub fn sidebar_event(&mut self, event: SidebarEvent) -> bool {
        self.sidebar.handle(event)
    }

    // =========================================================================
    // WhatsApp
    // =========================================================================

    /// WhatsApp order button pressed.
    ///
    /// Returns the link to open, or `None` if the button needs items and
    /// the cart is empty (the sidebar is opened instead).
    #[instrument(skip(self))]
    pub fn whatsapp_order(&mut self, button: OrderButton) -> Option<Url> {
        if button.requires_items() && self.cart.cart().is_empty() {
            self.notifier
                .notify(Toast::error("Your cart is empty! Add some items first."));
            self.sidebar.handle(SidebarEvent::EmptyOrderAttempted);
            return None;
        }

        let message = format_order_message(
            self.cart.cart(),
            self.profile.profile(),
            &self.config.message_options(),
        );
        let contact = self.rotation.pick_next();
        match whatsapp_url(&contact, &message) {
            Ok(url) => {
                info!(contact = %contact, items = self.cart.cart().len(), "Opening WhatsApp order");
                self.notifier
                    .notify(Toast::success("Opening WhatsApp with your order!"));
                Some(url)
            }
            Err(e) => {
                warn!(error = %e, "Failed to build WhatsApp link");
                self.notifier
                    .notify(Toast::error("Something went wrong. Please try again."));
                None
            }
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Checkout button pressed.
    ///
    /// Starts processing and sets the processing flag. The flag stays set
    /// until the returned checkout finishes or is dropped. Must be called
    /// from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if a checkout is already running or a
    /// precondition failed; an error toast is shown for the latter.
    pub fn begin_checkout(&mut self) -> Result<PendingCheckout, CheckoutError> {
        if self.processing.is_active() {
            return Err(CheckoutError::InProgress);
        }

        let request =
            CheckoutRequest::new(self.cart.cart(), self.profile.profile().delivery_address())
                .inspect_err(|e| self.notifier.notify(Toast::error(e.user_message())))?;

        let guard = self
            .processing
            .try_acquire()
            .ok_or(CheckoutError::InProgress)?;
        Ok(PendingCheckout::spawn(request, self.config.checkout_delay).holding(guard))
    }

    /// Apply the outcome of a checkout.
    ///
    /// On success the cart is cleared, the sidebar closed, and a success
    /// toast shown.
    ///
    /// # Errors
    ///
    /// Passes through the checkout's error after showing a toast.
    pub fn finish_checkout(
        &mut self,
        outcome: Result<OrderConfirmation, CheckoutError>,
    ) -> Result<OrderConfirmation, CheckoutError> {
        match &outcome {
            Ok(confirmation) => {
                info!(order_id = %confirmation.order_id, "Checkout complete");
                self.cart.clear();
                self.sidebar.handle(SidebarEvent::CheckoutCompleted);
                self.notifier.notify(Toast::success(
                    "Order placed successfully! We will call you shortly.",
                ));
            }
            Err(CheckoutError::Cancelled) => {
                self.notifier
                    .notify(Toast::info(CheckoutError::Cancelled.user_message()));
            }
            Err(e) => {
                warn!(error = %e, "Checkout failed");
                self.notifier.notify(Toast::error(e.user_message()));
            }
        }
        outcome
    }

    /// Run a checkout to completion.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if the checkout cannot start or does not
    /// complete.
    pub async fn checkout(&mut self) -> Result<OrderConfirmation, CheckoutError> {
        let pending = self.begin_checkout()?;
        let outcome = pending.wait().await;
        self.finish_checkout(outcome)
    }

    // =========================================================================
    // Customer details
    // =========================================================================

    /// Detect-location button pressed.
    ///
    /// On success the formatted coordinates become the delivery address.
    ///
    /// # Errors
    ///
    /// Returns the provider's `GeolocationError`; an error toast is shown.
    pub async fn detect_location<P>(&mut self, provider: &P) -> Result<String, GeolocationError>
    where
        P: LocationProvider + Sync,
    {
        self.notifier.notify(Toast::info("Detecting your location..."));

        match provider.current_position().await {
            Ok(coordinates) => {
                let address = coordinates.format_address(self.config.location.hint.as_deref());
                if let Err(e) = self.profile.set_address(address.clone()) {
                    warn!(error = %e, "Failed to persist detected address");
                }
                info!(address = %address, "Location detected");
                self.notifier
                    .notify(Toast::success("Location detected successfully!"));
                Ok(address)
            }
            Err(e) => {
                warn!(error = %e, "Location detection failed");
                self.notifier.notify(Toast::error(e.user_message()));
                Err(e)
            }
        }
    }

    /// Order form fields changed.
    pub fn update_profile(&mut self, update: ProfileUpdate) {
        if let Err(e) = self.profile.update(update) {
            warn!(error = %e, "Failed to persist customer profile");
        }
    }
}
