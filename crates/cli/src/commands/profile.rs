//! Customer profile commands.

use chapati_ordering::profile::ProfileUpdate;

use super::{CommandError, open_page, print};

/// Update saved customer details.
pub fn set(update: ProfileUpdate) -> Result<(), CommandError> {
    let mut page = open_page()?;
    page.update_profile(update);
    show_profile(&page);
    Ok(())
}

/// Show saved customer details.
pub fn show() -> Result<(), CommandError> {
    let page = open_page()?;
    show_profile(&page);
    Ok(())
}

fn show_profile(page: &super::CliPage) {
    let profile = page.profile();
    for (label, value) in [
        ("Name", &profile.name),
        ("Phone", &profile.phone),
        ("Email", &profile.email),
        ("Address", &profile.address),
        ("Instructions", &profile.instructions),
    ] {
        print(format!("{label:<14}{value}"));
    }
}
