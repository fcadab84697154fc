//! Shared HTTP plumbing for the provider clients

use std::time::{Duration, Instant};

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{Result, SafeHavenError};

const USER_AGENT: &str = concat!("SafeHaven/", env!("CARGO_PKG_VERSION"));

/// Responses slower than this are logged as a warning
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Build a client that retries transient failures with exponential backoff
pub fn build_client(timeout: Duration, max_retries: u32) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SafeHavenError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// GET `url` and decode the JSON body.
///
/// Transport failures, non-success statuses and undecodable bodies all
/// become [`SafeHavenError::Provider`] tagged with `provider`.
pub async fn get_json<T: DeserializeOwned>(
    client: &ClientWithMiddleware,
    provider: &str,
    url: &str,
) -> Result<T> {
    let started = Instant::now();

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SafeHavenError::provider(provider, format!("request failed: {e}")))?;

    let status = response.status();
    let elapsed = started.elapsed();
    debug!(
        "{} responded {} in {:.3}s",
        provider,
        status,
        elapsed.as_secs_f64()
    );
    if elapsed > SLOW_RESPONSE {
        warn!(
            "Slow {} response detected: {:.3}s",
            provider,
            elapsed.as_secs_f64()
        );
    }

    let body = response
        .text()
        .await
        .map_err(|e| SafeHavenError::provider(provider, format!("failed to read body: {e}")))?;

    if !status.is_success() {
        return Err(SafeHavenError::provider(
            provider,
            format!("HTTP {status}: {}", truncate(&body, 200)),
        ));
    }

    serde_json::from_str(&body)
        .map_err(|e| SafeHavenError::provider(provider, format!("malformed response: {e}")))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
