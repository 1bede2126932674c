//! Checkout command.
//!
//! Runs the checkout task with the configured processing delay. Ctrl-C
//! cancels it and leaves the cart as it was.

use chapati_ordering::OrderingError;
use chapati_ordering::profile::ProfileUpdate;

use super::{CommandError, open_page, print};

/// Place the order, optionally saving `address` first.
pub async fn run(address: Option<String>) -> Result<(), CommandError> {
    let mut page = open_page()?;
    if address.is_some() {
        page.update_profile(ProfileUpdate {
            address,
            ..ProfileUpdate::default()
        });
    }

    let pending = page.begin_checkout().map_err(OrderingError::from)?;
    let cancel = pending.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling checkout");
            cancel.cancel();
        }
    });

    print("Processing your order...");
    let outcome = pending.wait().await;
    ctrl_c.abort();

    let confirmation = page
        .finish_checkout(outcome)
        .map_err(OrderingError::from)?;
    print(confirmation.summary(page.config().currency));
    Ok(())
}
