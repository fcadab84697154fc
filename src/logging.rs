//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter directive for the given configuration. `RUST_LOG` wins when set.
#[must_use]
pub fn filter_directive(config: &LoggingConfig, verbose: bool) -> String {
    if let Ok(directive) = std::env::var("RUST_LOG") {
        if !directive.trim().is_empty() {
            return directive;
        }
    }
    let level = if verbose { "debug" } else { config.level.as_str() };
    format!("safehaven={level},warn")
}

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let filter = EnvFilter::try_new(filter_directive(config, verbose))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
