//! Weather provider abstraction
//!
//! The sampler only needs "current conditions at a point"; any source that can
//! answer that implements [`WeatherProvider`].

use async_trait::async_trait;

use crate::Result;
use crate::models::WeatherObservation;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Source of current weather observations
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the current observation at the given coordinates.
    ///
    /// Fails with [`crate::SafeHavenError::Provider`] on a non-success status
    /// or a malformed payload. Missing rain and wind figures are reported as 0.
    async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherObservation>;
}
