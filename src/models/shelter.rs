//! Shelter model for candidate safe destinations

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// A candidate safe destination (hospital, police station, ...) returned by a places lookup
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Shelter {
    /// Provider-specific identifier, used to de-duplicate merged searches
    pub id: Option<String>,
    pub name: String,
    pub location: GeoPoint,
    /// Free-text address or vicinity
    pub vicinity: Option<String>,
}

impl Shelter {
    #[must_use]
    pub fn new<S: Into<String>>(name: S, location: GeoPoint) -> Self {
        Self {
            id: None,
            name: name.into(),
            location,
            vicinity: None,
        }
    }

    /// Address line for display
    #[must_use]
    pub fn address(&self) -> &str {
        self.vicinity.as_deref().unwrap_or("No address")
    }
}
