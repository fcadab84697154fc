use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::SafeHavenError;
use crate::advisor::{Advisor, Recommendation};
use crate::models::{GeoPoint, WeatherObservation};
use crate::view::FALLBACK_ORIGIN;

#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<Advisor>,
}

/// `?lat=..&lng=..`; both absent means the fallback origin
#[derive(Debug, Deserialize)]
pub struct OriginQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl OriginQuery {
    fn origin(&self) -> Result<GeoPoint, SafeHavenError> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => GeoPoint::try_new(lat, lng),
            (None, None) => Ok(FALLBACK_ORIGIN),
            _ => Err(SafeHavenError::validation(
                "lat and lng must be given together",
            )),
        }
    }
}

#[derive(Serialize)]
pub struct ApiRecommendation {
    pub headline: String,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

#[derive(Serialize)]
pub struct ApiConditions {
    pub location: GeoPoint,
    pub conditions: WeatherObservation,
}

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
}

/// Error wrapper that renders as `{error, message}` JSON
pub struct ApiFailure(SafeHavenError);

impl From<SafeHavenError> for ApiFailure {
    fn from(error: SafeHavenError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            SafeHavenError::Validation { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
            SafeHavenError::NoCandidates => (StatusCode::NOT_FOUND, "no_shelters"),
            SafeHavenError::AllSamplesFailed | SafeHavenError::SampleFetch { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "weather_unavailable")
            }
            SafeHavenError::Provider { .. }
            | SafeHavenError::ProviderUnavailable { .. }
            | SafeHavenError::Timeout { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "provider_unavailable")
            }
            SafeHavenError::Config { .. } | SafeHavenError::Io { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };

        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }

        let body = ApiError {
            error: code.to_string(),
            message: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/recommendation", get(get_recommendation))
        .route("/conditions", get(get_conditions))
        .route("/health", get(get_health))
        .with_state(state)
}

async fn get_recommendation(
    State(state): State<AppState>,
    Query(query): Query<OriginQuery>,
) -> Result<Json<ApiRecommendation>, ApiFailure> {
    let origin = query.origin()?;
    let recommendation = state.advisor.recommend(&origin).await?;
    Ok(Json(ApiRecommendation {
        headline: recommendation.headline(),
        recommendation,
    }))
}

async fn get_conditions(
    State(state): State<AppState>,
    Query(query): Query<OriginQuery>,
) -> Result<Json<ApiConditions>, ApiFailure> {
    let location = query.origin()?;
    let conditions = state.advisor.current_conditions(&location).await?;
    Ok(Json(ApiConditions {
        location,
        conditions,
    }))
}

async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}
