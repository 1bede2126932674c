//! Order message formatting and `wa.me` deep links.
//!
//! The formatter is a pure function of the cart, the customer profile, and
//! the shop's display options. Only non-empty customer fields are included.

use std::fmt::Write as _;

use chapati_core::{CurrencyCode, PhoneNumber};
use url::Url;

use crate::cart::Cart;
use crate::profile::CustomerProfile;

/// Base of every outbound WhatsApp link.
pub const WHATSAPP_BASE: &str = "https://wa.me";

/// Shop-level settings that shape the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOptions {
    /// Shown upper-cased in the header, e.g. `PFG CHAPATI ORDER`.
    pub business_name: String,
    pub currency: CurrencyCode,
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self {
            business_name: "PFG Chapati".to_string(),
            currency: CurrencyCode::UGX,
        }
    }
}

/// Build the order message text.
///
/// Layout: header, one numbered line per item (`N. name × qty — subtotal`),
/// a total line, the non-empty customer fields, and a closing line. An
/// empty cart produces a menu enquiry instead of item and total lines.
#[must_use]
pub fn format_order_message(
    cart: &Cart,
    profile: &CustomerProfile,
    options: &MessageOptions,
) -> String {
    let currency = options.currency;
    let mut message = format!(
        "🥞 *{} ORDER* 🥞\n\nHello! I would like to order:\n\n",
        options.business_name.to_uppercase()
    );

    if cart.is_empty() {
        message.push_str("Please help me with the menu and prices.\n");
    } else {
        for (index, item) in cart.items().iter().enumerate() {
            let _ = writeln!(
                message,
                "{}. {} × {} — {}",
                index + 1,
                item.name,
                item.quantity,
                item.subtotal().display(currency)
            );
        }
        let _ = write!(
            message,
            "\n💰 *Total: {}*\n",
            cart.totals().total.display(currency)
        );
    }

    let fields = [
        ("📍 *Delivery Location:*", profile.address.trim()),
        ("👤 *Customer Name:*", profile.name.trim()),
        ("📞 *Phone Number:*", profile.phone.trim()),
        ("📧 *Email:*", profile.email.trim()),
        ("💬 *Special Instructions:*", profile.instructions.trim()),
    ];
    let mut wrote_field = false;
    for (label, value) in fields {
        if value.is_empty() {
            continue;
        }
        if !wrote_field {
            message.push('\n');
            wrote_field = true;
        }
        let _ = writeln!(message, "{label} {value}");
    }

    message.push_str("\n_Thank you! Looking forward to my delicious chapatis!_ 🥞");
    message
}

/// Build `https://wa.me/<digits>?text=<percent-encoded message>`.
///
/// # Errors
///
/// Returns `url::ParseError` if the assembled link is not a valid URL.
pub fn whatsapp_url(number: &PhoneNumber, message: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{WHATSAPP_BASE}/{}?text={}",
        number.as_str(),
        urlencoding::encode(message)
    ))
}
