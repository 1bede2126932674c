//! Location detection command.

use chapati_ordering::OrderingError;
use chapati_ordering::geolocation::{Coordinates, FixedLocationProvider, IpLocationProvider};

use super::{CommandError, open_page, print};

/// Detect the delivery location and save it as the address.
///
/// With `coordinates` the position is taken as given; otherwise it is
/// looked up from the configured IP geolocation service.
pub async fn run(coordinates: Option<(f64, f64)>) -> Result<(), CommandError> {
    let mut page = open_page()?;

    let detected = if let Some((latitude, longitude)) = coordinates {
        let provider = FixedLocationProvider::new(Coordinates::new(latitude, longitude));
        page.detect_location(&provider).await
    } else {
        let location = &page.config().location;
        let provider = IpLocationProvider::new(location.endpoint.clone(), location.timeout)
            .map_err(OrderingError::from)?;
        page.detect_location(&provider).await
    };
    let address = detected.map_err(OrderingError::from)?;

    print(format!("Delivery address: {address}"));
    Ok(())
}
