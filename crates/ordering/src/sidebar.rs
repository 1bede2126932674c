//! Cart sidebar open/closed state.

use chapati_core::SidebarState;
use tracing::debug;

/// Inputs that move the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarEvent {
    /// Cart icon in the header.
    IconClicked,
    /// An item was added to the cart.
    ItemAdded,
    /// A cart-bound order button was pressed with an empty cart.
    EmptyOrderAttempted,
    /// Close button inside the sidebar.
    CloseClicked,
    /// Click on the dimmed overlay.
    OverlayClicked,
    /// Escape key.
    EscapePressed,
    /// Checkout finished.
    CheckoutCompleted,
}

/// Two-state sidebar. Transitions are idempotent.
///
/// While open, page scrolling is locked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sidebar {
    state: SidebarState,
}

impl Sidebar {
    /// A closed sidebar.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SidebarState::Closed,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SidebarState {
        self.state
    }

    /// Whether the sidebar is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, SidebarState::Open)
    }

    /// Whether page scrolling should be locked.
    #[must_use]
    pub const fn locks_scroll(&self) -> bool {
        self.is_open()
    }

    /// Apply an event. Returns true if the state changed.
    pub fn handle(&mut self, event: SidebarEvent) -> bool {
        let next = match event {
            SidebarEvent::IconClicked
            | SidebarEvent::ItemAdded
            | SidebarEvent::EmptyOrderAttempted => SidebarState::Open,
            SidebarEvent::CloseClicked
            | SidebarEvent::OverlayClicked
            | SidebarEvent::EscapePressed
            | SidebarEvent::CheckoutCompleted => SidebarState::Closed,
        };

        if next == self.state {
            return false;
        }
        debug!(?event, from = ?self.state, to = ?next, "Sidebar transition");
        self.state = next;
        true
    }

    /// Open the sidebar. Returns true if it was closed.
    pub fn open(&mut self) -> bool {
        self.handle(SidebarEvent::IconClicked)
    }

    /// Close the sidebar. Returns true if it was open.
    pub fn close(&mut self) -> bool {
        self.handle(SidebarEvent::CloseClicked)
    }
}
