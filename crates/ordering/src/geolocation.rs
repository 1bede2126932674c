//! Delivery location detection.
//!
//! A [`LocationProvider`] yields [`Coordinates`], which are written into the
//! customer's delivery address as `"lat, lon"` with four decimals.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Format as a delivery address, e.g. `0.3136, 32.5811 (Near Busega)`.
    #[must_use]
    pub fn format_address(&self, hint: Option<&str>) -> String {
        let base = format!("{:.4}, {:.4}", self.latitude, self.longitude);
        match hint.map(str::trim).filter(|hint| !hint.is_empty()) {
            Some(hint) => format!("{base} ({hint})"),
            None => base,
        }
    }
}

/// Why the location could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable")]
    PositionUnavailable,

    #[error("location request timed out")]
    Timeout,

    #[error("location lookup failed: {0}")]
    Unknown(String),

    #[error("location detection not supported")]
    Unsupported,
}

impl GeolocationError {
    /// Map a provider error code (1 denied, 2 unavailable, 3 timeout).
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            other => Self::Unknown(format!("error code {other}")),
        }
    }

    /// Message suitable for a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        let detail = match self {
            Self::PermissionDenied => "Please allow location access.",
            Self::PositionUnavailable => "Location information unavailable.",
            Self::Timeout => "Location request timed out.",
            Self::Unknown(_) => "An unknown error occurred.",
            Self::Unsupported => return "Location detection not supported".to_string(),
        };
        format!("Could not detect your location. {detail}")
    }
}

/// Source of the customer's current position.
pub trait LocationProvider {
    /// Look up the current position.
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<Coordinates, GeolocationError>> + Send;
}

/// Provider with a position set by hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLocationProvider {
    coordinates: Coordinates,
}

impl FixedLocationProvider {
    #[must_use]
    pub const fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.coordinates)
    }
}

/// Provider for environments without any location source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocationProvider;

impl LocationProvider for NoLocationProvider {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Approximate position from an IP geolocation service.
#[derive(Debug, Clone)]
pub struct IpLocationProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl IpLocationProvider {
    /// Create a provider querying `endpoint` with the given timeout.
    ///
    /// # Errors
    ///
    /// Returns `GeolocationError::Unsupported` if the HTTP client cannot be
    /// built on this platform.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GeolocationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                warn!(error = %e, "Failed to build geolocation HTTP client");
                GeolocationError::Unsupported
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn classify(error: &reqwest::Error) -> GeolocationError {
        if error.is_timeout() {
            GeolocationError::Timeout
        } else if error.is_connect() {
            GeolocationError::PositionUnavailable
        } else {
            GeolocationError::Unknown(error.to_string())
        }
    }
}

impl LocationProvider for IpLocationProvider {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Self::classify(&e))?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(GeolocationError::PermissionDenied);
        }
        if !status.is_success() {
            warn!(status = %status, "Geolocation lookup returned non-success status");
            return Err(GeolocationError::Unknown(format!("HTTP {status}")));
        }

        let body: IpLookupResponse = response.json().await.map_err(|e| Self::classify(&e))?;
        if body.error {
            debug!(reason = ?body.reason, "Geolocation service reported an error");
            return Err(GeolocationError::PositionUnavailable);
        }

        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates::new(latitude, longitude)),
            _ => Err(GeolocationError::PositionUnavailable),
        }
    }
}
