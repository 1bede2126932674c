//! User-facing toast messages.
//!
//! The page shows one toast at a time: a new toast replaces whatever is on
//! screen. Toasts stay for [`Toast::DISPLAY_DURATION`] and then slide out
//! over [`Toast::EXIT_DURATION`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chapati_core::ToastKind;
use tracing::{error, info};

/// A transient on-screen message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    /// How long a toast is shown before it starts to leave.
    pub const DISPLAY_DURATION: Duration = Duration::from_secs(4);
    /// Length of the slide-out animation.
    pub const EXIT_DURATION: Duration = Duration::from_millis(300);

    /// Create a success toast.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    /// Create an error toast.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }

    /// Create an informational toast.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
        }
    }

    /// Total time on screen including the exit animation.
    #[must_use]
    pub fn lifetime() -> Duration {
        Self::DISPLAY_DURATION + Self::EXIT_DURATION
    }
}

/// Shows toasts to the user.
pub trait Notifier {
    /// Show `toast`, replacing any toast currently on screen.
    fn notify(&self, toast: Toast);
}

/// Notifier that writes toasts to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => error!(kind = %toast.kind, "{}", toast.message),
            ToastKind::Success | ToastKind::Info => {
                info!(kind = %toast.kind, "{}", toast.message);
            }
        }
    }
}

/// Notifier that keeps only the most recent toast.
///
/// Clones share the slot, so one handle can be given to the page while
/// another is used to read what is on screen.
#[derive(Debug, Clone, Default)]
pub struct ToastSlot {
    current: Arc<Mutex<Option<Toast>>>,
}

impl ToastSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The toast on screen, if any.
    #[must_use]
    pub fn current(&self) -> Option<Toast> {
        self.current.lock().ok().and_then(|slot| slot.clone())
    }

    /// Remove the toast from screen, returning it.
    pub fn dismiss(&self) -> Option<Toast> {
        self.current.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl Notifier for ToastSlot {
    fn notify(&self, toast: Toast) {
        if let Ok(mut slot) = self.current.lock() {
            *slot = Some(toast);
        }
    }
}
