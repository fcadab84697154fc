//! Configuration management for the `SafeHaven` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::SafeHavenError;
use crate::sampler::ScoreWeights;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `SafeHaven` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SafeHavenConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Directional sampling configuration
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Places provider configuration
    #[serde(default)]
    pub places: PlacesConfig,
    /// Routing provider configuration
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for the weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Unit system requested from the provider
    #[serde(default = "default_weather_units")]
    pub units: String,
    /// Per-sample timeout in seconds, retries included
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Directional sampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Angular displacement of each sample point (0.09 is roughly 10 km)
    #[serde(default = "default_offset_degrees")]
    pub offset_degrees: f64,
    /// Also sample the origin itself
    #[serde(default)]
    pub include_center: bool,
    /// Weight of the 1-hour rainfall in the risk score
    #[serde(default = "default_weight")]
    pub rain_weight: f64,
    /// Weight of the wind speed in the risk score
    #[serde(default = "default_weight")]
    pub wind_weight: f64,
}

/// Places provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Google Maps web services key
    pub api_key: Option<String>,
    #[serde(default = "default_maps_base_url")]
    pub base_url: String,
    /// Search radius in meters
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,
    /// Place categories considered shelters
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
}

/// Routing provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Google Maps web services key
    pub api_key: Option<String>,
    #[serde(default = "default_maps_base_url")]
    pub base_url: String,
    /// Travel mode (driving, walking, bicycling, transit)
    #[serde(default = "default_travel_mode")]
    pub travel_mode: String,
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weather_units() -> String {
    "metric".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_offset_degrees() -> f64 {
    0.09
}

fn default_weight() -> f64 {
    1.0
}

fn default_maps_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_radius_meters() -> u32 {
    10_000
}

fn default_categories() -> Vec<String> {
    vec!["hospital".to_string(), "police".to_string()]
}

fn default_provider_timeout() -> u32 {
    15
}

fn default_travel_mode() -> String {
    "driving".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            units: default_weather_units(),
            timeout_seconds: default_weather_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            offset_degrees: default_offset_degrees(),
            include_center: false,
            rain_weight: default_weight(),
            wind_weight: default_weight(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_maps_base_url(),
            radius_meters: default_radius_meters(),
            categories: default_categories(),
            timeout_seconds: default_provider_timeout(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_maps_base_url(),
            travel_mode: default_travel_mode(),
            timeout_seconds: default_provider_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl WeatherConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl SamplingConfig {
    /// Score weights derived from this configuration
    #[must_use]
    pub fn weights(&self) -> ScoreWeights {
        ScoreWeights {
            rain: self.rain_weight,
            wind: self.wind_weight,
        }
    }
}

impl PlacesConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl RoutingConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl SafeHavenConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. SAFEHAVEN_WEATHER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("SAFEHAVEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SafeHavenConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("safehaven").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.units.is_empty() {
            self.weather.units = default_weather_units();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.sampling.offset_degrees == 0.0 {
            self.sampling.offset_degrees = default_offset_degrees();
        }
        if self.places.base_url.is_empty() {
            self.places.base_url = default_maps_base_url();
        }
        if self.places.radius_meters == 0 {
            self.places.radius_meters = default_radius_meters();
        }
        if self.places.categories.is_empty() {
            self.places.categories = default_categories();
        }
        if self.places.timeout_seconds == 0 {
            self.places.timeout_seconds = default_provider_timeout();
        }
        if self.routing.base_url.is_empty() {
            self.routing.base_url = default_maps_base_url();
        }
        if self.routing.travel_mode.is_empty() {
            self.routing.travel_mode = default_travel_mode();
        }
        if self.routing.timeout_seconds == 0 {
            self.routing.timeout_seconds = default_provider_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// API keys are optional, but an empty one is always a mistake
    pub fn validate_api_keys(&self) -> Result<()> {
        let keys = [
            ("Weather", &self.weather.api_key),
            ("Places", &self.places.api_key),
            ("Routing", &self.routing.api_key),
        ];

        for (name, key) in keys {
            if let Some(key) = key {
                if key.trim().is_empty() {
                    return Err(SafeHavenError::config(format!(
                        "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(SafeHavenError::config("Weather API timeout cannot exceed 300 seconds").into());
        }

        if self.weather.max_retries > 10 {
            return Err(SafeHavenError::config("Weather API max retries cannot exceed 10").into());
        }

        let offset = self.sampling.offset_degrees;
        if !offset.is_finite() || offset <= 0.0 || offset > 5.0 {
            return Err(SafeHavenError::config(format!(
                "Sampling offset must be greater than 0 and at most 5 degrees, got {offset}"
            ))
            .into());
        }

        for (name, weight) in [
            ("rain", self.sampling.rain_weight),
            ("wind", self.sampling.wind_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SafeHavenError::config(format!(
                    "Score weight for {name} must be a non-negative number, got {weight}"
                ))
                .into());
            }
        }

        if self.places.radius_meters > 50_000 {
            return Err(SafeHavenError::config("Shelter search radius cannot exceed 50000 meters").into());
        }

        if self.places.timeout_seconds > 300 || self.routing.timeout_seconds > 300 {
            return Err(SafeHavenError::config("Provider timeouts cannot exceed 300 seconds").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SafeHavenError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SafeHavenError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_travel_modes = ["driving", "walking", "bicycling", "transit"];
        if !valid_travel_modes.contains(&self.routing.travel_mode.as_str()) {
            return Err(SafeHavenError::config(format!(
                "Invalid travel mode '{}'. Must be one of: {}",
                self.routing.travel_mode,
                valid_travel_modes.join(", ")
            ))
            .into());
        }

        if self.places.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(SafeHavenError::config("Shelter categories cannot be blank").into());
        }

        for (name, url) in [
            ("Weather", &self.weather.base_url),
            ("Places", &self.places.base_url),
            ("Routing", &self.routing.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SafeHavenError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SafeHavenConfig::default();
        assert_eq!(config.weather.base_url, "https://api.openweathermap.org/data/2.5");
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.sampling.offset_degrees, 0.09);
        assert!(!config.sampling.include_center);
        assert_eq!(config.places.radius_meters, 10_000);
        assert_eq!(config.places.categories, vec!["hospital", "police"]);
        assert_eq!(config.logging.level, "info");
        assert!(config.weather.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_weights_from_sampling_config() {
        let mut config = SafeHavenConfig::default();
        config.sampling.rain_weight = 2.0;
        let weights = config.sampling.weights();
        assert_eq!(weights.rain, 2.0);
        assert_eq!(weights.wind, 1.0);
    }

    #[test]
    fn test_config_validation_empty_api_key() {
        let mut config = SafeHavenConfig::default();
        config.places.api_key = Some("  ".to_string());
        let result = config.validate_api_keys();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Places API key"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = SafeHavenConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_offset_must_be_positive() {
        let mut config = SafeHavenConfig::default();
        config.sampling.offset_degrees = -0.5;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Sampling offset"));
    }

    #[test]
    fn test_config_validation_negative_weight() {
        let mut config = SafeHavenConfig::default();
        config.sampling.wind_weight = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = SafeHavenConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_apply_defaults_repairs_zero_values() {
        let mut config = SafeHavenConfig::default();
        config.sampling.offset_degrees = 0.0;
        config.places.categories.clear();
        config.server.port = 0;
        config.apply_defaults();
        assert_eq!(config.sampling.offset_degrees, 0.09);
        assert_eq!(config.places.categories.len(), 2);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("safehaven-test-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[sampling]\noffset_degrees = 0.5\ninclude_center = true\nrain_weight = 2.0\n\n[places]\nradius_meters = 5000"
        )
        .unwrap();

        let config = SafeHavenConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.sampling.offset_degrees, 0.5);
        assert!(config.sampling.include_center);
        assert_eq!(config.sampling.rain_weight, 2.0);
        assert_eq!(config.sampling.wind_weight, 1.0);
        assert_eq!(config.places.radius_meters, 5000);
        assert_eq!(config.weather.timeout_seconds, 10);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = SafeHavenConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("safehaven"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
