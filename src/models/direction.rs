//! Compass directions and scored directional weather samples

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{GeoPoint, WeatherObservation};
use crate::SafeHavenError;

/// Compass label of a sample point around the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompassDirection {
    North,
    South,
    East,
    West,
    /// The origin itself
    Center,
}

impl CompassDirection {
    /// The four outer directions in enumeration (and tie-break) order
    pub const CARDINALS: [CompassDirection; 4] = [
        CompassDirection::North,
        CompassDirection::South,
        CompassDirection::East,
        CompassDirection::West,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CompassDirection::North => "north",
            CompassDirection::South => "south",
            CompassDirection::East => "east",
            CompassDirection::West => "west",
            CompassDirection::Center => "center",
        }
    }

    /// Target bearing in degrees clockwise from true north. `Center` has none.
    #[must_use]
    pub fn target_bearing(self) -> Option<f64> {
        match self {
            CompassDirection::North => Some(0.0),
            CompassDirection::East => Some(90.0),
            CompassDirection::South => Some(180.0),
            CompassDirection::West => Some(270.0),
            CompassDirection::Center => None,
        }
    }

    /// Sign of the (latitude, longitude) displacement for this direction
    #[must_use]
    pub fn unit_offset(self) -> (f64, f64) {
        match self {
            CompassDirection::North => (1.0, 0.0),
            CompassDirection::South => (-1.0, 0.0),
            CompassDirection::East => (0.0, 1.0),
            CompassDirection::West => (0.0, -1.0),
            CompassDirection::Center => (0.0, 0.0),
        }
    }

    /// Sample point for this direction around `origin`
    #[must_use]
    pub fn sample_point(self, origin: &GeoPoint, offset_degrees: f64) -> GeoPoint {
        let (lat_sign, lng_sign) = self.unit_offset();
        origin.offset(lat_sign * offset_degrees, lng_sign * offset_degrees)
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CompassDirection {
    type Err = SafeHavenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Ok(CompassDirection::North),
            "south" | "s" => Ok(CompassDirection::South),
            "east" | "e" => Ok(CompassDirection::East),
            "west" | "w" => Ok(CompassDirection::West),
            "center" | "centre" | "c" => Ok(CompassDirection::Center),
            other => Err(SafeHavenError::validation(format!(
                "unknown compass direction '{other}'"
            ))),
        }
    }
}

/// Weather sampled at one offset point and reduced to a risk score
#[derive(Debug, Clone, Serialize)]
pub struct DirectionSample {
    pub direction: CompassDirection,
    pub point: GeoPoint,
    /// Lower is safer. `f64::INFINITY` when the sample could not be fetched
    /// (serialized as `null`).
    pub score: f64,
    /// The observation the score was computed from, absent on failure
    pub observation: Option<WeatherObservation>,
}

impl DirectionSample {
    /// A sample whose fetch failed
    #[must_use]
    pub fn unavailable(direction: CompassDirection, point: GeoPoint) -> Self {
        Self {
            direction,
            point,
            score: f64::INFINITY,
            observation: None,
        }
    }

    /// True when no observation was fetched. A fetched observation whose score
    /// could not be computed still ranks last but is not counted as a failure.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.observation.is_none()
    }
}
