//! Data models for the SafeHaven application
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic points
//! - Weather: Observations fetched from the weather provider
//! - Shelter: Candidate safe destinations from the places provider
//! - Direction: Compass labels and scored directional samples

pub mod direction;
pub mod location;
pub mod shelter;
pub mod weather;

// Re-export all public types for convenient access
pub use direction::{CompassDirection, DirectionSample};
pub use location::GeoPoint;
pub use shelter::Shelter;
pub use weather::WeatherObservation;
