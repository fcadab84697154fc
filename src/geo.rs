//! Spherical geometry helpers: bearings, circular angle differences and ground distance

use crate::models::GeoPoint;

/// Wrap any angle in degrees into [0, 360)
#[inline]
#[must_use]
pub fn normalize_bearing(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Great-circle initial bearing from `from` to `to` in degrees clockwise
/// from true north, normalized to [0, 360).
///
/// Identical points yield 0.
#[must_use]
pub fn initial_bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    normalize_bearing(y.atan2(x).to_degrees())
}

/// Circular separation between two bearings, in [0, 180]
#[inline]
#[must_use]
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let diff = (normalize_bearing(a) - normalize_bearing(b)).abs();
    diff.min(360.0 - diff)
}

/// Haversine ground distance in kilometers
#[must_use]
pub fn distance_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: from.latitude,
            longitude: from.longitude,
        },
        haversine::Location {
            latitude: to.latitude,
            longitude: to.longitude,
        },
        haversine::Units::Kilometers,
    )
}
