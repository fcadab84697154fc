use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::Result;
use crate::advisor::Advisor;
use crate::api::{self, AppState};

/// Upper bound for one request, covering sampling, search and routing
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub fn app(advisor: Arc<Advisor>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router(AppState { advisor }))
        .layer(
            ServiceBuilder::new()
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    REQUEST_TIMEOUT,
                ))
                .layer(cors),
        )
}

pub async fn run(port: u16, advisor: Arc<Advisor>) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server running at http://localhost:{}", port);
    axum::serve(listener, app(advisor)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, Shelter, WeatherObservation};
    use crate::places::PlacesProvider;
    use crate::weather::WeatherProvider;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    struct Offline;

    #[async_trait]
    impl WeatherProvider for Offline {
        async fn fetch_weather(&self, _latitude: f64, _longitude: f64) -> Result<WeatherObservation> {
            Err(crate::SafeHavenError::provider("weather", "offline"))
        }
    }

    #[async_trait]
    impl PlacesProvider for Offline {
        async fn search_nearby(
            &self,
            _origin: &GeoPoint,
            _radius_meters: u32,
            _categories: &[String],
        ) -> Result<Vec<Shelter>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_app_serves_api_with_cors() {
        let advisor = Advisor::new(Arc::new(Offline), Arc::new(Offline), None);
        let response = app(Arc::new(advisor))
            .oneshot(
                Request::get("/api/health")
                    .header("origin", "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
