//! Google Places Nearby Search client

use async_trait::async_trait;
use futures::future::join_all;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::{PlacesProvider, merge_unique};
use crate::config::PlacesConfig;
use crate::http;
use crate::models::{GeoPoint, Shelter};
use crate::{Result, SafeHavenError};

const PROVIDER: &str = "places";

pub struct GooglePlacesClient {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

impl GooglePlacesClient {
    pub fn new(config: &PlacesConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            SafeHavenError::config(
                "Places API key is missing. Set SAFEHAVEN_PLACES__API_KEY or places.api_key.",
            )
        })?;

        Ok(Self {
            client: http::build_client(config.timeout(), 1)?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, origin: &GeoPoint, radius_meters: u32, category: &str) -> String {
        format!(
            "{}/place/nearbysearch/json?location={}&radius={}&type={}&key={}",
            self.base_url,
            origin.to_query_value(),
            radius_meters,
            urlencoding::encode(category),
            urlencoding::encode(&self.api_key)
        )
    }

    async fn search_category(
        &self,
        origin: &GeoPoint,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<Shelter>> {
        let response: NearbySearchResponse = http::get_json(
            &self.client,
            PROVIDER,
            &self.url(origin, radius_meters, category),
        )
        .await?;

        match response.status.as_str() {
            "OK" => Ok(response.results.into_iter().map(Shelter::from).collect()),
            "ZERO_RESULTS" => Ok(Vec::new()),
            status => Err(SafeHavenError::provider(
                PROVIDER,
                match response.error_message {
                    Some(message) => format!("{status}: {message}"),
                    None => status.to_string(),
                },
            )),
        }
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    /// Categories are queried concurrently and merged in the configured order.
    /// A failing category is skipped unless every category fails.
    #[instrument(name = "search_nearby", skip(self))]
    async fn search_nearby(
        &self,
        origin: &GeoPoint,
        radius_meters: u32,
        categories: &[String],
    ) -> Result<Vec<Shelter>> {
        let outcomes = join_all(
            categories
                .iter()
                .map(|category| self.search_category(origin, radius_meters, category)),
        )
        .await;

        let mut batches = Vec::new();
        let mut first_error = None;
        for (category, outcome) in categories.iter().zip(outcomes) {
            match outcome {
                Ok(batch) => batches.push(batch),
                Err(e) => {
                    warn!("Shelter search for '{}' failed: {}", category, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        if batches.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        let shelters = merge_unique(batches);
        info!(
            "Found {} shelters within {}m of {}",
            shelters.len(),
            radius_meters,
            origin
        );
        Ok(shelters)
    }
}

/// Nearby Search response
#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
    status: String,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: Option<String>,
    name: String,
    vicinity: Option<String>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<PlaceResult> for Shelter {
    fn from(place: PlaceResult) -> Self {
        Self {
            id: place.place_id,
            name: place.name,
            location: GeoPoint::new(place.geometry.location.lat, place.geometry.location.lng),
            vicinity: place.vicinity,
        }
    }
}
