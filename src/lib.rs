//! `SafeHaven` - weather-aware emergency shelter recommendations
//!
//! Samples current weather in the four compass directions around a point,
//! picks the calmest one and recommends the nearby shelter that lies closest
//! to that direction, together with a route to it.

pub mod advisor;
pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod http;
pub mod logging;
pub mod models;
pub mod places;
pub mod risk;
pub mod routing;
pub mod sampler;
pub mod selector;
pub mod view;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use advisor::{Advisor, Progress, Recommendation};
pub use config::SafeHavenConfig;
pub use error::SafeHavenError;
pub use models::{CompassDirection, DirectionSample, GeoPoint, Shelter, WeatherObservation};
pub use places::{GooglePlacesClient, PlacesProvider};
pub use risk::{RiskAssessment, RiskLevel};
pub use routing::{GoogleDirectionsClient, Route, RoutingProvider};
pub use sampler::{SampledDirections, ScoreWeights, WeatherSampler};
pub use selector::{DirectionalShelterSelector, ShelterMatch};
pub use view::MapViewState;
pub use weather::{OpenWeatherClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SafeHavenError>;
