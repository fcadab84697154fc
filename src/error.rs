//! Error types and handling for the `SafeHaven` application

use thiserror::Error;

use crate::models::CompassDirection;

/// Main error type for the `SafeHaven` application
#[derive(Error, Debug)]
pub enum SafeHavenError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// An external provider answered with a non-success status, a malformed
    /// payload, or could not be reached at all
    #[error("{provider} provider error: {message}")]
    Provider { provider: String, message: String },

    /// A single directional weather fetch failed. Only ever logged by the
    /// sampler, which scores the direction as infinite instead.
    #[error("Weather sample for {direction} failed: {message}")]
    SampleFetch {
        direction: CompassDirection,
        message: String,
    },

    /// Every directional weather fetch failed
    #[error("Weather data unavailable: every directional sample failed")]
    AllSamplesFailed,

    /// The shelter search came back empty
    #[error("No shelters found nearby")]
    NoCandidates,

    /// The routing provider could not produce a route
    #[error("Routing unavailable: {status}")]
    ProviderUnavailable { status: String },

    /// An external call took longer than allowed
    #[error("{what} timed out after {seconds}s")]
    Timeout { what: String, seconds: u64 },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SafeHavenError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a new routing-unavailable error carrying the provider's status verbatim
    pub fn provider_unavailable<S: Into<String>>(status: S) -> Self {
        Self::ProviderUnavailable {
            status: status.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SafeHavenError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            SafeHavenError::Validation { message } => format!("Invalid input: {message}"),
            SafeHavenError::Provider { .. } | SafeHavenError::Timeout { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            SafeHavenError::SampleFetch { .. } | SafeHavenError::AllSamplesFailed => {
                "Weather data unavailable. No safe direction can be determined right now."
                    .to_string()
            }
            SafeHavenError::NoCandidates => "No shelters found nearby.".to_string(),
            SafeHavenError::ProviderUnavailable { status } => {
                format!("Directions request failed: {status}")
            }
            SafeHavenError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
