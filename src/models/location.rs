//! Geographic point model

use serde::{Deserialize, Serialize};

use crate::{Result, SafeHavenError};

/// A WGS-84 point in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point without range checks
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a point from user input, rejecting non-finite or out-of-range coordinates
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SafeHavenError::validation(format!(
                "latitude {latitude} must be between -90 and 90"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SafeHavenError::validation(format!(
                "longitude {longitude} must be between -180 and 180"
            )));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Point displaced by the given number of degrees on each axis.
    ///
    /// Latitude past a pole is reflected back over it (moving to the opposite
    /// meridian) and longitude is wrapped into [-180, 180).
    #[must_use]
    pub fn offset(&self, delta_latitude: f64, delta_longitude: f64) -> Self {
        let mut latitude = self.latitude + delta_latitude;
        let mut longitude = self.longitude + delta_longitude;
        if latitude > 90.0 {
            latitude = 180.0 - latitude;
            longitude += 180.0;
        } else if latitude < -90.0 {
            latitude = -180.0 - latitude;
            longitude += 180.0;
        }
        Self::new(latitude, wrap_longitude(longitude))
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Comma-joined `lat,lng` pair as used in provider query strings
    #[must_use]
    pub fn to_query_value(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Wrap a longitude into [-180, 180)
fn wrap_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.format_coordinates())
    }
}
