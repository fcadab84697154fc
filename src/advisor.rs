//! End-to-end shelter recommendation
//!
//! Ties the pieces together: sample the weather around the origin, pick the
//! calmest direction, look up shelters, select the one best aligned with that
//! direction and, when a router is configured, fetch a route to it.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::SafeHavenConfig;
use crate::models::{CompassDirection, GeoPoint, WeatherObservation};
use crate::places::{GooglePlacesClient, PlacesProvider};
use crate::risk::RiskAssessment;
use crate::routing::{GoogleDirectionsClient, Route, RoutingProvider, directions_url};
use crate::sampler::{SampledDirections, WeatherSampler};
use crate::selector::{DirectionalShelterSelector, ShelterMatch};
use crate::weather::{OpenWeatherClient, WeatherProvider};
use crate::{Result, SafeHavenError};

/// Milestones reported while a recommendation is being computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    AnalyzingWeather,
    SearchingShelters(CompassDirection),
}

/// Everything needed to present a shelter recommendation
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub origin: GeoPoint,
    pub safer_direction: CompassDirection,
    pub samples: SampledDirections,
    /// Present when the center was sampled alongside all four directions
    pub central_risk: Option<RiskAssessment>,
    pub shelter: ShelterMatch,
    /// Number of shelters the selection was made from
    pub candidates: usize,
    pub route: Option<Route>,
    /// Routing status when the route lookup failed; the shelter still stands
    pub route_error: Option<String>,
    pub directions_url: String,
}

impl Recommendation {
    /// Headline describing why this shelter was chosen
    #[must_use]
    pub fn headline(&self) -> String {
        match self.safer_direction {
            CompassDirection::Center => format!(
                "Conditions are stable here. Nearest shelter: {}",
                self.shelter.shelter.name
            ),
            direction => format!(
                "Safest weather vector: {direction}. Recommended shelter: {}",
                self.shelter.shelter.name
            ),
        }
    }
}

pub struct Advisor {
    weather: Arc<dyn WeatherProvider>,
    sampler: WeatherSampler,
    places: Arc<dyn PlacesProvider>,
    routing: Option<Arc<dyn RoutingProvider>>,
    radius_meters: u32,
    categories: Vec<String>,
    timeout: Duration,
}

impl Advisor {
    /// Advisor with default sampling over the given providers
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        places: Arc<dyn PlacesProvider>,
        routing: Option<Arc<dyn RoutingProvider>>,
    ) -> Self {
        let defaults = SafeHavenConfig::default();
        Self {
            sampler: WeatherSampler::new(weather.clone()),
            weather,
            places,
            routing,
            radius_meters: defaults.places.radius_meters,
            categories: defaults.places.categories,
            timeout: defaults.weather.timeout(),
        }
    }

    /// Advisor backed by the real providers. Routing is skipped when no
    /// routing key is configured.
    pub fn from_config(config: &SafeHavenConfig) -> Result<Self> {
        let weather: Arc<dyn WeatherProvider> = Arc::new(OpenWeatherClient::new(&config.weather)?);
        let places: Arc<dyn PlacesProvider> = Arc::new(GooglePlacesClient::new(&config.places)?);
        let routing: Option<Arc<dyn RoutingProvider>> = match config.routing.api_key {
            Some(_) => Some(Arc::new(GoogleDirectionsClient::new(&config.routing)?)),
            None => {
                warn!("No routing API key configured; routes will not be fetched");
                None
            }
        };

        Ok(Self::new(weather, places, routing).configure(config))
    }

    /// Apply sampling, search and timeout settings
    #[must_use]
    pub fn configure(mut self, config: &SafeHavenConfig) -> Self {
        self.timeout = config.weather.timeout();
        self.sampler =
            WeatherSampler::from_config(self.weather.clone(), &config.sampling, self.timeout);
        self.radius_meters = config.places.radius_meters;
        self.categories = config.places.categories.clone();
        self
    }

    #[must_use]
    pub fn with_sampler(mut self, sampler: WeatherSampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Current conditions at a single point
    #[instrument(skip(self))]
    pub async fn current_conditions(&self, origin: &GeoPoint) -> Result<WeatherObservation> {
        tokio::time::timeout(
            self.timeout,
            self.weather.fetch_weather(origin.latitude, origin.longitude),
        )
        .await
        .map_err(|_| SafeHavenError::Timeout {
            what: "Weather request".to_string(),
            seconds: self.timeout.as_secs(),
        })?
    }

    pub async fn recommend(&self, origin: &GeoPoint) -> Result<Recommendation> {
        self.recommend_with_progress(origin, &mut |_| {}).await
    }

    /// Compute a recommendation, reporting milestones to `on_progress`.
    ///
    /// Fails with [`SafeHavenError::AllSamplesFailed`] when no direction could
    /// be scored and with [`SafeHavenError::NoCandidates`] when the shelter
    /// search is empty. A routing failure is recorded in the result instead.
    #[instrument(skip(self, on_progress))]
    pub async fn recommend_with_progress(
        &self,
        origin: &GeoPoint,
        on_progress: &mut (dyn FnMut(Progress) + Send),
    ) -> Result<Recommendation> {
        on_progress(Progress::AnalyzingWeather);
        let samples = self.sampler.sample_directions(origin).await;
        if samples.all_failed() {
            return Err(SafeHavenError::AllSamplesFailed);
        }
        let safer_direction = samples
            .safest()
            .map(|s| s.direction)
            .ok_or(SafeHavenError::AllSamplesFailed)?;

        on_progress(Progress::SearchingShelters(safer_direction));
        let shelters = self
            .places
            .search_nearby(origin, self.radius_meters, &self.categories)
            .await?;
        if shelters.is_empty() {
            return Err(SafeHavenError::NoCandidates);
        }

        let best = DirectionalShelterSelector::select_best(origin, &shelters, safer_direction)?;
        let shelter = ShelterMatch::measure(origin, best, safer_direction);
        info!(
            "Recommending '{}' ({:.1} km, bearing {:.0}°) for direction {}",
            shelter.shelter.name, shelter.distance_km, shelter.bearing, safer_direction
        );

        let (route, route_error) = match &self.routing {
            Some(router) => match router.route(origin, &shelter.shelter.location).await {
                Ok(route) => (Some(route), None),
                Err(e) => {
                    warn!("Route lookup failed: {}", e);
                    let status = match e {
                        SafeHavenError::ProviderUnavailable { status } => status,
                        other => other.to_string(),
                    };
                    (None, Some(status))
                }
            },
            None => (None, None),
        };

        Ok(Recommendation {
            origin: *origin,
            safer_direction,
            central_risk: samples.central_risk(),
            directions_url: directions_url(origin, &shelter.shelter.location),
            samples,
            shelter,
            candidates: shelters.len(),
            route,
            route_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Shelter;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct UniformWeather(Option<WeatherObservation>);

    #[async_trait]
    impl WeatherProvider for UniformWeather {
        async fn fetch_weather(&self, _latitude: f64, _longitude: f64) -> Result<WeatherObservation> {
            self.0
                .clone()
                .ok_or_else(|| SafeHavenError::provider("weather", "HTTP 503"))
        }
    }

    struct FixedPlaces {
        shelters: Result<Vec<Shelter>>,
        calls: Mutex<usize>,
    }

    impl FixedPlaces {
        fn new(shelters: Vec<Shelter>) -> Self {
            Self {
                shelters: Ok(shelters),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl PlacesProvider for FixedPlaces {
        async fn search_nearby(
            &self,
            _origin: &GeoPoint,
            _radius_meters: u32,
            _categories: &[String],
        ) -> Result<Vec<Shelter>> {
            *self.calls.lock().unwrap() += 1;
            match &self.shelters {
                Ok(shelters) => Ok(shelters.clone()),
                Err(_) => Err(SafeHavenError::provider("places", "REQUEST_DENIED")),
            }
        }
    }

    struct FailingRouter;

    #[async_trait]
    impl RoutingProvider for FailingRouter {
        async fn route(&self, _origin: &GeoPoint, _destination: &GeoPoint) -> Result<Route> {
            Err(SafeHavenError::provider_unavailable("OVER_QUERY_LIMIT"))
        }
    }

    fn calm() -> WeatherObservation {
        WeatherObservation {
            temperature: 26.0,
            humidity: 60.0,
            pressure: 1010.0,
            wind_speed: 2.0,
            rain_1h: 0.0,
            observed_at: None,
            description: None,
        }
    }

    fn origin() -> GeoPoint {
        GeoPoint::new(13.0827, 80.2707)
    }

    fn shelters() -> Vec<Shelter> {
        vec![
            Shelter::new("North Clinic", GeoPoint::new(13.12, 80.2707)),
            Shelter::new("South Station", GeoPoint::new(13.04, 80.2707)),
        ]
    }

    #[tokio::test]
    async fn test_all_samples_failed_is_reported_and_skips_search() {
        let places = Arc::new(FixedPlaces::new(shelters()));
        let advisor = Advisor::new(Arc::new(UniformWeather(None)), places.clone(), None);

        let err = advisor.recommend(&origin()).await.unwrap_err();

        assert!(matches!(err, SafeHavenError::AllSamplesFailed));
        assert_eq!(*places.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_no_shelters_is_reported() {
        let advisor = Advisor::new(
            Arc::new(UniformWeather(Some(calm()))),
            Arc::new(FixedPlaces::new(Vec::new())),
            None,
        );

        let err = advisor.recommend(&origin()).await.unwrap_err();
        assert!(matches!(err, SafeHavenError::NoCandidates));
    }

    #[tokio::test]
    async fn test_places_failure_is_surfaced() {
        let places = FixedPlaces {
            shelters: Err(SafeHavenError::provider("places", "down")),
            calls: Mutex::new(0),
        };
        let advisor = Advisor::new(
            Arc::new(UniformWeather(Some(calm()))),
            Arc::new(places),
            None,
        );

        let err = advisor.recommend(&origin()).await.unwrap_err();
        assert!(matches!(err, SafeHavenError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_uniform_weather_picks_north_first() {
        let advisor = Advisor::new(
            Arc::new(UniformWeather(Some(calm()))),
            Arc::new(FixedPlaces::new(shelters())),
            None,
        );

        let mut stages = Vec::new();
        let recommendation = advisor
            .recommend_with_progress(&origin(), &mut |p| stages.push(p))
            .await
            .unwrap();

        assert_eq!(recommendation.safer_direction, CompassDirection::North);
        assert_eq!(recommendation.shelter.shelter.name, "North Clinic");
        assert_eq!(recommendation.candidates, 2);
        assert!(recommendation.route.is_none());
        assert!(recommendation.route_error.is_none());
        assert!(recommendation.directions_url.contains("destination=13.12,80.2707"));
        assert_eq!(
            stages,
            vec![
                Progress::AnalyzingWeather,
                Progress::SearchingShelters(CompassDirection::North)
            ]
        );
    }

    #[tokio::test]
    async fn test_routing_failure_keeps_recommendation() {
        let advisor = Advisor::new(
            Arc::new(UniformWeather(Some(calm()))),
            Arc::new(FixedPlaces::new(shelters())),
            Some(Arc::new(FailingRouter)),
        );

        let recommendation = advisor.recommend(&origin()).await.unwrap();

        assert_eq!(recommendation.shelter.shelter.name, "North Clinic");
        assert_eq!(recommendation.route_error.as_deref(), Some("OVER_QUERY_LIMIT"));
    }

    #[tokio::test]
    async fn test_center_safest_picks_nearest_shelter() {
        // only the origin itself reports calm wind
        struct CalmCenter;

        #[async_trait]
        impl WeatherProvider for CalmCenter {
            async fn fetch_weather(&self, latitude: f64, longitude: f64) -> Result<WeatherObservation> {
                let mut reading = calm();
                if (latitude - 13.0827).abs() > 1e-9 || (longitude - 80.2707).abs() > 1e-9 {
                    reading.wind_speed = 12.0;
                }
                Ok(reading)
            }
        }

        let mut config = SafeHavenConfig::default();
        config.sampling.include_center = true;
        let advisor = Advisor::new(
            Arc::new(CalmCenter),
            Arc::new(FixedPlaces::new(vec![
                Shelter::new("Far North", GeoPoint::new(13.2, 80.2707)),
                Shelter::new("Close South", GeoPoint::new(13.07, 80.2707)),
            ])),
            None,
        )
        .configure(&config);

        let recommendation = advisor.recommend(&origin()).await.unwrap();

        assert_eq!(recommendation.safer_direction, CompassDirection::Center);
        assert_eq!(recommendation.shelter.shelter.name, "Close South");
        assert!(recommendation.headline().starts_with("Conditions are stable here"));
        assert!(recommendation.central_risk.is_some());
    }

    #[tokio::test]
    async fn test_current_conditions() {
        let advisor = Advisor::new(
            Arc::new(UniformWeather(Some(calm()))),
            Arc::new(FixedPlaces::new(Vec::new())),
            None,
        );
        let observation = advisor.current_conditions(&origin()).await.unwrap();
        assert_eq!(observation.pressure, 1010.0);
    }
}
