//! Cyclone / storm classification from the five-point sample set
//!
//! A falling barometer at the origin relative to its surroundings, combined with
//! saturated air and strong wind, is the signature of a low-pressure system
//! sitting on top of the user.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::WeatherObservation;

/// Overall storm risk at the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    High,
    Extreme,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "LOW",
            RiskLevel::High => "HIGH",
            RiskLevel::Extreme => "EXTREME",
        })
    }
}

/// Result of [`assess_central_risk`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// Mean surrounding pressure minus center pressure, in hPa
    pub pressure_drop: f64,
}

impl RiskAssessment {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self.level {
            RiskLevel::Extreme => "Cyclone conditions likely. Move to shelter immediately.",
            RiskLevel::High => "Severe weather developing. Prepare to move to shelter.",
            RiskLevel::Low => "No storm signature detected.",
        }
    }
}

const EXTREME_PRESSURE_DROP: f64 = 6.0;
const EXTREME_HUMIDITY: f64 = 85.0;
const EXTREME_WIND: f64 = 15.0;

const HIGH_PRESSURE_DROP: f64 = 4.0;
const HIGH_HUMIDITY: f64 = 80.0;
const HIGH_WIND: f64 = 10.0;

const HIGH_RAIN_1H: f64 = 20.0;
const HIGH_TEMPERATURE: f64 = 40.0;

/// Classify the storm risk at the origin.
///
/// `surrounding` holds the north, south, east and west observations; the
/// pressure drop is their mean pressure minus the center pressure. An empty
/// slice yields a drop of 0.
#[must_use]
pub fn assess_central_risk(
    center: &WeatherObservation,
    surrounding: &[WeatherObservation],
) -> RiskAssessment {
    let pressure_drop = if surrounding.is_empty() {
        0.0
    } else {
        let total: f64 = surrounding.iter().map(|o| o.pressure).sum();
        total / surrounding.len() as f64 - center.pressure
    };

    let level = if pressure_drop > EXTREME_PRESSURE_DROP
        && center.humidity > EXTREME_HUMIDITY
        && center.wind_speed > EXTREME_WIND
    {
        RiskLevel::Extreme
    } else if pressure_drop > HIGH_PRESSURE_DROP
        && center.humidity > HIGH_HUMIDITY
        && center.wind_speed > HIGH_WIND
    {
        RiskLevel::High
    } else if center.rain_1h > HIGH_RAIN_1H || center.temperature > HIGH_TEMPERATURE {
        RiskLevel::High
    } else {
        RiskLevel::Low
    };

    RiskAssessment {
        level,
        pressure_drop,
    }
}
