//! OpenWeatherMap current-weather client

use async_trait::async_trait;
use chrono::DateTime;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::WeatherProvider;
use crate::config::WeatherConfig;
use crate::http;
use crate::models::WeatherObservation;
use crate::{Result, SafeHavenError};

const PROVIDER: &str = "weather";

/// Client for the OpenWeatherMap `/weather` endpoint
pub struct OpenWeatherClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    units: String,
}

impl OpenWeatherClient {
    /// Create a new client. An API key is required by the provider.
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            SafeHavenError::config(
                "Weather API key is missing. Set SAFEHAVEN_WEATHER__API_KEY or weather.api_key.",
            )
        })?;

        Ok(Self {
            client: http::build_client(config.timeout(), config.max_retries)?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            units: config.units.clone(),
        })
    }

    fn url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/weather?lat={}&lon={}&appid={}&units={}",
            self.base_url,
            latitude,
            longitude,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&self.units)
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(name = "fetch_weather", level = "debug", skip(self))]
    async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherObservation> {
        let response: CurrentWeatherResponse =
            http::get_json(&self.client, PROVIDER, &self.url(latitude, longitude)).await?;
        let observation = WeatherObservation::from(response);
        debug!(
            "Observed rain {} mm, wind {} m/s at ({:.4}, {:.4})",
            observation.rain_1h, observation.wind_speed, latitude, longitude
        );
        Ok(observation)
    }
}

/// Current weather response from OpenWeatherMap
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    main: MainBlock,
    #[serde(default)]
    wind: Option<WindBlock>,
    #[serde(default)]
    rain: Option<RainBlock>,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RainBlock {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: Option<String>,
}

impl From<CurrentWeatherResponse> for WeatherObservation {
    fn from(response: CurrentWeatherResponse) -> Self {
        Self {
            temperature: response.main.temp,
            humidity: response.main.humidity,
            pressure: response.main.pressure,
            wind_speed: response.wind.and_then(|w| w.speed).unwrap_or(0.0),
            rain_1h: response.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
            observed_at: response
                .dt
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            description: response
                .weather
                .into_iter()
                .find_map(|condition| condition.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: String) -> WeatherConfig {
        WeatherConfig {
            api_key: Some("test-key".to_string()),
            base_url,
            max_retries: 0,
            ..WeatherConfig::default()
        }
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let result = OpenWeatherClient::new(&WeatherConfig::default());
        assert!(matches!(result, Err(SafeHavenError::Config { .. })));
    }

    #[test]
    fn test_missing_rain_and_wind_default_to_zero() {
        let response: CurrentWeatherResponse = serde_json::from_str(
            r#"{"main": {"temp": 30.2, "humidity": 70, "pressure": 1008}}"#,
        )
        .unwrap();
        let observation = WeatherObservation::from(response);
        assert_eq!(observation.rain_1h, 0.0);
        assert_eq!(observation.wind_speed, 0.0);
        assert_eq!(observation.pressure, 1008.0);
        assert!(observation.observed_at.is_none());
    }

    #[tokio::test]
    async fn test_fetch_weather_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/weather")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("lat".into(), "13.0827".into()),
                mockito::Matcher::UrlEncoded("lon".into(), "80.2707".into()),
                mockito::Matcher::UrlEncoded("appid".into(), "test-key".into()),
                mockito::Matcher::UrlEncoded("units".into(), "metric".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "weather": [{"id": 501, "main": "Rain", "description": "moderate rain"}],
                    "main": {"temp": 27.4, "feels_like": 31.0, "humidity": 88, "pressure": 1002},
                    "wind": {"speed": 9.3, "deg": 140},
                    "rain": {"1h": 3.55},
                    "dt": 1700000000
                }"#,
            )
            .create_async()
            .await;

        let client = OpenWeatherClient::new(&test_config(server.url())).unwrap();
        let observation = client.fetch_weather(13.0827, 80.2707).await.unwrap();

        mock.assert_async().await;
        assert_eq!(observation.temperature, 27.4);
        assert_eq!(observation.humidity, 88.0);
        assert_eq!(observation.wind_speed, 9.3);
        assert_eq!(observation.rain_1h, 3.55);
        assert_eq!(observation.description.as_deref(), Some("moderate rain"));
        assert!(observation.observed_at.is_some());
    }

    #[tokio::test]
    async fn test_fetch_weather_missing_main_block_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"cod": 200}"#)
            .create_async()
            .await;

        let client = OpenWeatherClient::new(&test_config(server.url())).unwrap();
        let err = client.fetch_weather(1.0, 2.0).await.unwrap_err();
        assert!(matches!(err, SafeHavenError::Provider { .. }));
    }
}
