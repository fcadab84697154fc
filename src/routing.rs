//! Route lookup between the origin and the selected shelter
//!
//! Routing is best-effort: a failed lookup never invalidates the shelter
//! recommendation, it only changes what is shown alongside it.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::RoutingConfig;
use crate::http;
use crate::models::GeoPoint;
use crate::{Result, SafeHavenError};

const PROVIDER: &str = "routing";

/// A drawable route as returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub summary: String,
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub distance_text: Option<String>,
    pub duration_text: Option<String>,
    /// Encoded overview polyline for rendering
    pub polyline: Option<String>,
}

impl Route {
    /// One-line description for display
    #[must_use]
    pub fn describe(&self) -> String {
        let distance = self
            .distance_text
            .clone()
            .unwrap_or_else(|| format!("{:.1} km", self.distance_meters as f64 / 1000.0));
        let duration = self
            .duration_text
            .clone()
            .unwrap_or_else(|| format!("{} min", self.duration_seconds.div_ceil(60)));
        if self.summary.is_empty() {
            format!("{distance}, {duration}")
        } else {
            format!("via {}: {distance}, {duration}", self.summary)
        }
    }
}

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Route from `origin` to `destination`.
    ///
    /// Fails with [`SafeHavenError::ProviderUnavailable`] carrying the
    /// provider's status string unchanged.
    async fn route(&self, origin: &GeoPoint, destination: &GeoPoint) -> Result<Route>;
}

/// Link that opens turn-by-turn directions in Google Maps
#[must_use]
pub fn directions_url(origin: &GeoPoint, destination: &GeoPoint) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&origin={}&destination={}",
        origin.to_query_value(),
        destination.to_query_value()
    )
}

/// Google Directions API client
pub struct GoogleDirectionsClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    travel_mode: String,
}

impl GoogleDirectionsClient {
    pub fn new(config: &RoutingConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            SafeHavenError::config(
                "Routing API key is missing. Set SAFEHAVEN_ROUTING__API_KEY or routing.api_key.",
            )
        })?;

        Ok(Self {
            client: http::build_client(config.timeout(), 1)?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            travel_mode: config.travel_mode.clone(),
        })
    }

    fn url(&self, origin: &GeoPoint, destination: &GeoPoint) -> String {
        format!(
            "{}/directions/json?origin={}&destination={}&mode={}&key={}",
            self.base_url,
            origin.to_query_value(),
            destination.to_query_value(),
            urlencoding::encode(&self.travel_mode),
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait]
impl RoutingProvider for GoogleDirectionsClient {
    #[instrument(name = "route", skip(self))]
    async fn route(&self, origin: &GeoPoint, destination: &GeoPoint) -> Result<Route> {
        let response: DirectionsResponse =
            http::get_json(&self.client, PROVIDER, &self.url(origin, destination))
                .await
                .map_err(|e| SafeHavenError::provider_unavailable(e.to_string()))?;

        if response.status != "OK" {
            return Err(SafeHavenError::provider_unavailable(response.status));
        }

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| SafeHavenError::provider_unavailable("ZERO_RESULTS"))?;

        Ok(route.into())
    }
}

/// Directions API response
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<RouteResult>,
}

#[derive(Debug, Deserialize)]
struct RouteResult {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    legs: Vec<Leg>,
    overview_polyline: Option<Polyline>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: Option<TextValue>,
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: Option<String>,
    value: u64,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    points: String,
}

impl From<RouteResult> for Route {
    fn from(route: RouteResult) -> Self {
        let distance_meters = route
            .legs
            .iter()
            .filter_map(|leg| leg.distance.as_ref())
            .map(|d| d.value)
            .sum();
        let duration_seconds = route
            .legs
            .iter()
            .filter_map(|leg| leg.duration.as_ref())
            .map(|d| d.value)
            .sum();

        // leg texts only describe the whole route when there is a single leg
        let (distance_text, duration_text) = match route.legs.as_slice() {
            [leg] => (
                leg.distance.as_ref().and_then(|d| d.text.clone()),
                leg.duration.as_ref().and_then(|d| d.text.clone()),
            ),
            _ => (None, None),
        };

        Self {
            summary: route.summary,
            distance_meters,
            duration_seconds,
            distance_text,
            duration_text,
            polyline: route.overview_polyline.map(|p| p.points),
        }
    }
}
