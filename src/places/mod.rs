//! Shelter search abstraction

use async_trait::async_trait;

use crate::Result;
use crate::models::{GeoPoint, Shelter};

pub mod google;

pub use google::GooglePlacesClient;

/// Source of candidate shelters around a point
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Find shelters of the given categories within `radius_meters` of `origin`.
    ///
    /// An empty result is a valid "nothing found" answer. Provider-level
    /// failures are returned as errors rather than collapsed into an empty list.
    async fn search_nearby(
        &self,
        origin: &GeoPoint,
        radius_meters: u32,
        categories: &[String],
    ) -> Result<Vec<Shelter>>;
}

/// Merge per-category result lists, keeping the first occurrence of each place id
#[must_use]
pub fn merge_unique(batches: Vec<Vec<Shelter>>) -> Vec<Shelter> {
    let mut seen = std::collections::HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|shelter| match &shelter.id {
            Some(id) => seen.insert(id.clone()),
            None => true,
        })
        .collect()
}
