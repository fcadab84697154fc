//! Weather observation model and display methods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single current-conditions reading for one point
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherObservation {
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Atmospheric pressure in hPa
    pub pressure: f64,
    /// Wind speed in m/s, 0 when the provider omits it
    pub wind_speed: f64,
    /// Rainfall over the last hour in mm, 0 when the provider omits it
    pub rain_1h: f64,
    /// Time of the measurement as reported by the provider
    pub observed_at: Option<DateTime<Utc>>,
    /// Human-readable description of weather conditions
    pub description: Option<String>,
}

impl WeatherObservation {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1}°C", self.temperature)
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{:.0}%", self.humidity)
    }

    /// Format atmospheric pressure with unit
    #[must_use]
    pub fn format_pressure(&self) -> String {
        format!("{:.0} hPa", self.pressure)
    }

    #[must_use]
    pub fn format_rainfall(&self) -> String {
        format!("{} mm", self.rain_1h)
    }

    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} m/s", self.wind_speed)
    }
}
