//! Directional weather sampling
//!
//! Weather is fetched concurrently at points offset north, south, east and west
//! of the origin (and optionally at the origin itself), each reading is reduced
//! to a scalar risk score, and the samples are returned safest first.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::SafeHavenError;
use crate::config::SamplingConfig;
use crate::models::{CompassDirection, DirectionSample, GeoPoint, WeatherObservation};
use crate::risk::{RiskAssessment, assess_central_risk};
use crate::weather::WeatherProvider;

/// Per-signal weights of the risk score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub rain: f64,
    pub wind: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            rain: 1.0,
            wind: 1.0,
        }
    }
}

/// `rain_1h * rain_weight + wind_speed * wind_weight`. Lower is safer.
#[must_use]
pub fn risk_score(observation: &WeatherObservation, weights: &ScoreWeights) -> f64 {
    let score = observation.rain_1h * weights.rain + observation.wind_speed * weights.wind;
    if score.is_nan() { f64::INFINITY } else { score }
}

/// Samples ranked by ascending score
#[derive(Debug, Clone, Serialize)]
pub struct SampledDirections {
    pub origin: GeoPoint,
    pub samples: Vec<DirectionSample>,
}

impl SampledDirections {
    /// The lowest-scoring sample. With every sample failed this is the first
    /// direction in enumeration order; check [`Self::all_failed`].
    #[must_use]
    pub fn safest(&self) -> Option<&DirectionSample> {
        self.samples.first()
    }

    /// True when no direction produced a usable observation
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.samples.iter().all(DirectionSample::is_unavailable)
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_unavailable()).count()
    }

    #[must_use]
    pub fn get(&self, direction: CompassDirection) -> Option<&DirectionSample> {
        self.samples.iter().find(|s| s.direction == direction)
    }

    /// Storm classification at the origin. Needs a successful center sample and
    /// all four surrounding ones.
    #[must_use]
    pub fn central_risk(&self) -> Option<RiskAssessment> {
        let center = self.get(CompassDirection::Center)?.observation.as_ref()?;
        let surrounding = CompassDirection::CARDINALS
            .iter()
            .map(|&d| self.get(d).and_then(|s| s.observation.clone()))
            .collect::<Option<Vec<_>>>()?;
        Some(assess_central_risk(center, &surrounding))
    }
}

/// Fans out weather requests around an origin and ranks the directions
pub struct WeatherSampler {
    provider: Arc<dyn WeatherProvider>,
    offset_degrees: f64,
    weights: ScoreWeights,
    include_center: bool,
    timeout: Duration,
}

impl WeatherSampler {
    /// Sampler with a 0.09° offset (about 10 km), unit weights, four directions
    /// and a 10 second per-sample timeout
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            offset_degrees: 0.09,
            weights: ScoreWeights::default(),
            include_center: false,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(
        provider: Arc<dyn WeatherProvider>,
        config: &SamplingConfig,
        timeout: Duration,
    ) -> Self {
        Self::new(provider)
            .with_offset_degrees(config.offset_degrees)
            .with_weights(config.weights())
            .with_center(config.include_center)
            .with_timeout(timeout)
    }

    #[must_use]
    pub fn with_offset_degrees(mut self, offset_degrees: f64) -> Self {
        self.offset_degrees = offset_degrees;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub fn with_center(mut self, include_center: bool) -> Self {
        self.include_center = include_center;
        self
    }

    /// Upper bound on each individual fetch, retries included
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sampled directions in enumeration order
    #[must_use]
    pub fn directions(&self) -> Vec<CompassDirection> {
        let mut directions = CompassDirection::CARDINALS.to_vec();
        if self.include_center {
            directions.push(CompassDirection::Center);
        }
        directions
    }

    /// Sample every configured direction around `origin`.
    ///
    /// Never fails: a direction whose fetch errors or times out is scored
    /// `f64::INFINITY` and sorts last. The sort is stable, so equal scores keep
    /// enumeration order.
    #[instrument(skip(self), fields(offset = self.offset_degrees))]
    pub async fn sample_directions(&self, origin: &GeoPoint) -> SampledDirections {
        let fetches = self.directions().into_iter().map(|direction| {
            let point = direction.sample_point(origin, self.offset_degrees);
            self.sample(direction, point)
        });

        let mut samples = join_all(fetches).await;
        samples.sort_by(|a, b| a.score.total_cmp(&b.score));

        let ranked = SampledDirections {
            origin: *origin,
            samples,
        };

        match ranked.safest() {
            Some(best) if !ranked.all_failed() => info!(
                "Safest direction {} (score {:.2}, {} of {} samples failed)",
                best.direction,
                best.score,
                ranked.failed_count(),
                ranked.samples.len()
            ),
            _ => warn!("Every directional weather sample failed"),
        }

        ranked
    }

    async fn sample(&self, direction: CompassDirection, point: GeoPoint) -> DirectionSample {
        let fetch = self
            .provider
            .fetch_weather(point.latitude, point.longitude);

        let failure = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(Ok(observation)) => {
                let score = risk_score(&observation, &self.weights);
                debug!("Sample {} at {} scored {:.2}", direction, point, score);
                return DirectionSample {
                    direction,
                    point,
                    score,
                    observation: Some(observation),
                };
            }
            Ok(Err(e)) => SafeHavenError::SampleFetch {
                direction,
                message: e.to_string(),
            },
            Err(_) => SafeHavenError::SampleFetch {
                direction,
                message: format!("timed out after {:.1}s", self.timeout.as_secs_f64()),
            },
        };

        warn!("{}", failure);
        DirectionSample::unavailable(direction, point)
    }
}
