//! WhatsApp order command.
//!
//! Prints the `wa.me` link for the current cart. Each call picks the next
//! contact number in the rotation.

use chapati_core::OrderButton;

use super::{CommandError, open_page, print};

/// Print the order link for `button`.
pub fn whatsapp(button: OrderButton) -> Result<(), CommandError> {
    let mut page = open_page()?;
    match page.whatsapp_order(button) {
        Some(url) => print(url),
        None => print("Your cart is empty! Add some items first."),
    }
    Ok(())
}
