//! Checkout as a cancellable background task.
//!
//! There is no payment backend: checkout checks its preconditions, waits a
//! short processing delay, and produces an [`OrderConfirmation`]. The task
//! is owned by a [`PendingCheckout`]; cancelling it or dropping the handle
//! stops the task and leaves the cart untouched.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chapati_core::{CurrencyCode, Price};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::cart::{Cart, LineItem};

/// Default simulated processing time.
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(1500);

/// Checkout failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// No delivery address entered or detected.
    #[error("delivery address is required")]
    MissingAddress,

    /// Another checkout is already processing.
    #[error("checkout already in progress")]
    InProgress,

    /// Cancelled before processing finished.
    #[error("checkout was cancelled")]
    Cancelled,

    /// The background task panicked.
    #[error("checkout task failed: {0}")]
    TaskFailed(String),
}

impl CheckoutError {
    /// Message suitable for a toast.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyCart => "Your cart is empty! Please add some items first.",
            Self::MissingAddress => "Please enter your delivery location!",
            Self::InProgress => "Your order is already being processed.",
            Self::Cancelled => "Checkout cancelled",
            Self::TaskFailed(_) => "Something went wrong placing your order. Please try again.",
        }
    }
}

/// The result of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: Uuid,
    pub placed_at: DateTime<Utc>,
    pub lines: Vec<LineItem>,
    pub total: Price,
    pub delivery_address: String,
}

impl OrderConfirmation {
    /// Human-readable confirmation text.
    #[must_use]
    pub fn summary(&self, currency: CurrencyCode) -> String {
        let items: Vec<String> = self
            .lines
            .iter()
            .map(|line| {
                format!(
                    "{} x{} - {}",
                    line.name,
                    line.quantity,
                    line.subtotal().display(currency)
                )
            })
            .collect();
        format!(
            "Order Confirmed!\n\nOrder ID: {}\n\nItems:\n{}\n\nTotal: {}\nDelivery: {}\n\nWe will call you shortly to confirm your order!",
            self.order_id,
            items.join("\n"),
            self.total.display(currency),
            self.delivery_address
        )
    }
}

/// Snapshot of what is being ordered, with preconditions checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    lines: Vec<LineItem>,
    total: Price,
    delivery_address: String,
}

impl CheckoutRequest {
    /// Snapshot `cart` for checkout.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no items, or
    /// `CheckoutError::MissingAddress` if the address is blank.
    pub fn new(cart: &Cart, delivery_address: Option<&str>) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let delivery_address = delivery_address
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .ok_or(CheckoutError::MissingAddress)?;

        Ok(Self {
            lines: cart.items().to_vec(),
            total: cart.totals().total,
            delivery_address: delivery_address.to_string(),
        })
    }

    /// Order total.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    fn confirm(self) -> OrderConfirmation {
        OrderConfirmation {
            order_id: Uuid::new_v4(),
            placed_at: Utc::now(),
            lines: self.lines,
            total: self.total,
            delivery_address: self.delivery_address,
        }
    }
}

/// Cancels a pending checkout from elsewhere.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    signal: Arc<Notify>,
}

impl CancelHandle {
    /// Request cancellation. Has no effect once processing has finished.
    pub fn cancel(&self) {
        self.signal.notify_one();
    }
}

/// Whether a checkout is in progress.
///
/// Clones share one flag. The flag is held by a [`ProcessingGuard`] and
/// clears when the guard is dropped.
#[derive(Debug, Clone, Default)]
pub struct ProcessingFlag {
    active: Arc<AtomicBool>,
}

impl ProcessingFlag {
    /// Create a cleared flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a guard currently holds the flag.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Set the flag, or `None` if it is already held.
    #[must_use]
    pub fn try_acquire(&self) -> Option<ProcessingGuard> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProcessingGuard {
                active: Arc::clone(&self.active),
            })
    }
}

/// Holds a [`ProcessingFlag`] until dropped.
#[derive(Debug)]
pub struct ProcessingGuard {
    active: Arc<AtomicBool>,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

/// A checkout in progress.
///
/// Dropping it aborts the task and releases any processing guard it holds.
#[derive(Debug)]
pub struct PendingCheckout {
    handle: JoinHandle<Result<OrderConfirmation, CheckoutError>>,
    cancel: CancelHandle,
    guard: Option<ProcessingGuard>,
}

impl PendingCheckout {
    /// Start processing `request` on the current tokio runtime.
    ///
    /// Must be called from within a runtime.
    #[must_use]
    pub fn spawn(request: CheckoutRequest, delay: Duration) -> Self {
        let signal = Arc::new(Notify::new());
        let cancelled = Arc::clone(&signal);
        let span = info_span!("checkout", total = %request.total, delay_ms = delay.as_millis());

        let handle = tokio::spawn(
            async move {
                debug!("Processing order");
                tokio::select! {
                    () = tokio::time::sleep(delay) => {
                        let confirmation = request.confirm();
                        info!(order_id = %confirmation.order_id, "Order placed");
                        Ok(confirmation)
                    }
                    () = cancelled.notified() => {
                        info!("Checkout cancelled");
                        Err(CheckoutError::Cancelled)
                    }
                }
            }
            .instrument(span),
        );

        Self {
            handle,
            cancel: CancelHandle { signal },
            guard: None,
        }
    }

    /// Keep `guard` held until this checkout finishes or is dropped.
    #[must_use]
    pub fn holding(mut self, guard: ProcessingGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// A handle that can cancel this checkout.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the outcome. Any processing guard is released on return.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Cancelled` if the checkout was cancelled or
    /// aborted, or `CheckoutError::TaskFailed` if the task panicked.
    pub async fn wait(mut self) -> Result<OrderConfirmation, CheckoutError> {
        match (&mut self.handle).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(CheckoutError::Cancelled),
            Err(e) => Err(CheckoutError::TaskFailed(e.to_string())),
        }
    }
}

impl Drop for PendingCheckout {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
