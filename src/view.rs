//! Presentation state for one user session
//!
//! Owns the markers, route and status text that a map surface would display.
//! The recommendation logic never touches this; it only returns values that
//! are applied here.

use std::fmt;

use serde::Serialize;

use crate::SafeHavenError;
use crate::advisor::{Progress, Recommendation};
use crate::models::{GeoPoint, WeatherObservation};
use crate::routing::Route;

/// Chennai, used when the user's position cannot be determined
pub const FALLBACK_ORIGIN: GeoPoint = GeoPoint::new(13.0827, 80.2707);

const IDLE_STATUS: &str = "Request a safe place for a recommendation.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: GeoPoint,
    pub title: String,
}

impl Marker {
    fn new<S: Into<String>>(position: GeoPoint, title: S) -> Self {
        Self {
            position,
            title: title.into(),
        }
    }
}

/// What the shelter panel shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPanel {
    pub name: String,
    pub address: String,
    pub directions_url: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MapViewState {
    pub center: Option<GeoPoint>,
    pub user_marker: Option<Marker>,
    pub selected_marker: Option<Marker>,
    pub safe_place_marker: Option<Marker>,
    pub route: Option<Route>,
    pub conditions: Option<WeatherObservation>,
    pub result: Option<ResultPanel>,
    pub status: String,
}

impl MapViewState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: IDLE_STATUS.to_string(),
            ..Self::default()
        }
    }

    /// Position reported by the device
    pub fn set_user_location(&mut self, position: GeoPoint) {
        self.user_marker = Some(Marker::new(position, "Your Location"));
        self.focus(position);
    }

    /// Position picked explicitly by the user; takes precedence over the device position
    pub fn select_location(&mut self, position: GeoPoint) {
        self.selected_marker = Some(Marker::new(position, "Selected Location"));
        self.focus(position);
    }

    /// Origin for the next recommendation
    #[must_use]
    pub fn active_origin(&self) -> Option<GeoPoint> {
        self.selected_marker
            .as_ref()
            .or(self.user_marker.as_ref())
            .map(|m| m.position)
    }

    fn focus(&mut self, position: GeoPoint) {
        self.center = Some(position);
        self.clear_recommendation();
        self.conditions = None;
        self.status = IDLE_STATUS.to_string();
    }

    pub fn clear_recommendation(&mut self) {
        self.safe_place_marker = None;
        self.route = None;
        self.result = None;
    }

    pub fn show_conditions(&mut self, conditions: Result<WeatherObservation, &SafeHavenError>) {
        match conditions {
            Ok(observation) => {
                self.conditions = Some(observation);
                self.status = "Current weather loaded. Request a safe place for full analysis."
                    .to_string();
            }
            Err(_) => {
                self.conditions = None;
                self.status = "Could not load weather data.".to_string();
            }
        }
    }

    pub fn apply_progress(&mut self, progress: Progress) {
        self.status = match progress {
            Progress::AnalyzingWeather => "Analyzing surrounding weather...".to_string(),
            Progress::SearchingShelters(direction) => {
                format!("Safest weather vector: {direction}. Searching shelters...")
            }
        };
    }

    pub fn show_recommendation(&mut self, recommendation: &Recommendation) {
        let shelter = &recommendation.shelter.shelter;
        self.safe_place_marker = Some(Marker::new(shelter.location, shelter.name.clone()));
        self.route = recommendation.route.clone();
        self.result = Some(ResultPanel {
            name: shelter.name.clone(),
            address: shelter.address().to_string(),
            directions_url: recommendation.directions_url.clone(),
        });
        self.status = match (&recommendation.route, &recommendation.route_error) {
            (Some(_), _) => "Safe route displayed.".to_string(),
            (None, Some(status)) => format!("Shelter found. Route unavailable: {status}"),
            (None, None) => "Shelter found. Open the directions link for a route.".to_string(),
        };
    }

    pub fn show_failure(&mut self, error: &SafeHavenError) {
        self.clear_recommendation();
        self.status = error.user_message();
    }
}

impl fmt::Display for MapViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = self.active_origin() {
            writeln!(f, "📍 Location: {}", origin.format_coordinates())?;
        }

        if let Some(conditions) = &self.conditions {
            writeln!(f, "   🌡️ Temperature: {}", conditions.format_temperature())?;
            writeln!(f, "   💧 Humidity: {}", conditions.format_humidity())?;
            writeln!(f, "   🧭 Pressure: {}", conditions.format_pressure())?;
            writeln!(f, "   🌧️ Rainfall: {}", conditions.format_rainfall())?;
        }

        if let Some(result) = &self.result {
            writeln!(f, "🏥 {}", result.name)?;
            writeln!(f, "   {}", result.address)?;
            if let Some(route) = &self.route {
                writeln!(f, "   🚗 {}", route.describe())?;
            }
            writeln!(f, "   🗺️ {}", result.directions_url)?;
        }

        write!(f, "{}", self.status)
    }
}
