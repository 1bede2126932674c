//! Status enums shared by the ordering components.

use serde::{Deserialize, Serialize};

/// Severity of an on-screen toast message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
}

impl std::fmt::Display for ToastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Visibility of the cart sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SidebarState {
    #[default]
    Closed,
    Open,
}

/// What decrementing a line item at quantity 1 does.
///
/// Both policies keep the quantity >= 1 invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DecrementPolicy {
    /// Leave the item at quantity 1; the remove button deletes it.
    #[default]
    KeepAtOne,
    /// Remove the item from the cart.
    RemoveAtZero,
}

impl std::fmt::Display for DecrementPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeepAtOne => write!(f, "keep"),
            Self::RemoveAtZero => write!(f, "remove"),
        }
    }
}

impl std::str::FromStr for DecrementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(Self::KeepAtOne),
            "remove" => Ok(Self::RemoveAtZero),
            _ => Err(format!("invalid decrement policy: {s} (expected keep or remove)")),
        }
    }
}

/// WhatsApp entry points on the page.
///
/// Cart-bound buttons refuse to send an empty order; the call-to-action
/// buttons in the hero and footer sections may send a menu enquiry instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderButton {
    /// Button inside the cart sidebar.
    #[default]
    Cart,
    /// Floating button in the page corner.
    Floating,
    /// Call-to-action in the hero section.
    Hero,
    /// Large call-to-action near the footer.
    Large,
}

impl OrderButton {
    /// Whether this button requires items in the cart.
    #[must_use]
    pub const fn requires_items(&self) -> bool {
        matches!(self, Self::Cart | Self::Floating)
    }
}

impl std::fmt::Display for OrderButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cart => write!(f, "cart"),
            Self::Floating => write!(f, "floating"),
            Self::Hero => write!(f, "hero"),
            Self::Large => write!(f, "large"),
        }
    }
}

impl std::str::FromStr for OrderButton {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart" => Ok(Self::Cart),
            "floating" => Ok(Self::Floating),
            "hero" => Ok(Self::Hero),
            "large" => Ok(Self::Large),
            _ => Err(format!("invalid order button: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_policy_roundtrip() {
        for policy in [DecrementPolicy::KeepAtOne, DecrementPolicy::RemoveAtZero] {
            let parsed: DecrementPolicy = policy.to_string().parse().unwrap();
            assert_eq!(parsed, policy);
        }
        assert!("drop".parse::<DecrementPolicy>().is_err());
    }

    #[test]
    fn test_order_button_requires_items() {
        assert!(OrderButton::Cart.requires_items());
        assert!(OrderButton::Floating.requires_items());
        assert!(!OrderButton::Hero.requires_items());
        assert!(!OrderButton::Large.requires_items());
    }

    #[test]
    fn test_sidebar_defaults_closed() {
        assert_eq!(SidebarState::default(), SidebarState::Closed);
    }
}
