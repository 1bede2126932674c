//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! chapati cart add --id x1 --name "Plain Chapati" --price 1500
//! chapati cart increase x1
//! chapati cart decrease x1
//! chapati cart remove x1
//! chapati cart clear
//! chapati cart show --html
//! ```

use chapati_core::ProductId;
use chapati_ordering::OrderingError;
use chapati_ordering::cart::Decrement;

use super::{CommandError, open_page, print};

/// Add one unit of a product.
pub fn add(id: &str, name: &str, price: &str, image: &str) -> Result<(), CommandError> {
    let mut page = open_page()?;
    let quantity = page
        .add_to_cart(id, name, price, image)
        .map_err(OrderingError::from)?;
    print(format!("{} x{quantity}", name.trim()));
    summary(&page);
    Ok(())
}

/// Raise a product's quantity by one.
pub fn increase(id: &str) -> Result<(), CommandError> {
    let mut page = open_page()?;
    let quantity = page
        .increase(&ProductId::new(id))
        .ok_or_else(|| CommandError::UnknownItem(id.to_owned()))?;
    print(format!("{id} x{quantity}"));
    summary(&page);
    Ok(())
}

/// Lower a product's quantity by one.
pub fn decrease(id: &str) -> Result<(), CommandError> {
    let mut page = open_page()?;
    match page.decrease(&ProductId::new(id)) {
        Decrement::Lowered(quantity) => print(format!("{id} x{quantity}")),
        Decrement::Removed => print(format!("Removed {id}")),
        Decrement::Unchanged => print(format!("{id} x1 (use `cart remove` to delete it)")),
        Decrement::NotFound => return Err(CommandError::UnknownItem(id.to_owned())),
    }
    summary(&page);
    Ok(())
}

/// Remove a product.
pub fn remove(id: &str) -> Result<(), CommandError> {
    let mut page = open_page()?;
    if !page.remove(&ProductId::new(id)) {
        return Err(CommandError::UnknownItem(id.to_owned()));
    }
    print(format!("Removed {id}"));
    summary(&page);
    Ok(())
}

/// Empty the cart.
pub fn clear() -> Result<(), CommandError> {
    let mut page = open_page()?;
    print(if page.clear_cart() {
        "Cart cleared"
    } else {
        "Cart is already empty"
    });
    Ok(())
}

/// Show the cart.
pub fn show(html: bool) -> Result<(), CommandError> {
    let page = open_page()?;
    if html {
        print(page.cart().renderer().count_html());
        print(page.cart().renderer().items_html());
        return Ok(());
    }

    let view = page.cart().view();
    if view.is_empty() {
        print("Your cart is empty");
        return Ok(());
    }
    for item in &view.items {
        print(format!(
            "{:<12} {:<24} x{:<3} {:>14}",
            item.id, item.name, item.quantity, item.line_price
        ));
    }
    summary(&page);
    Ok(())
}

fn summary(page: &super::CliPage) {
    let view = page.cart().view();
    print(format!("Items: {}  Total: {}", view.item_count, view.total));
}
