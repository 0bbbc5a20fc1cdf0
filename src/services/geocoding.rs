//! Geocoding abstraction layer
//!
//! - `MockGeocoder` for tests and offline runs (deterministic, no network)
//! - `TomTomGeocoder` for production (TomTom fuzzy search)
//!
//! The backend is chosen from configuration: TomTom when `TOMTOM_API_KEY`
//! is set, mock otherwise.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::services::tomtom_search::TomTomSearchClient;
use crate::types::Coordinates;

/// Autocomplete kicks in from this many characters
pub const MIN_SUGGEST_QUERY_LEN: usize = 2;

/// Autocomplete candidate count
pub const SUGGEST_LIMIT: usize = 5;

/// Geocoder trait - abstraction for all geocoding implementations
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Up to `limit` candidates for a free-text query, best first
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<GeocodingResult>>;

    /// Resolve a free-text query to its first candidate.
    /// Returns None if nothing matches.
    async fn geocode(&self, query: &str) -> Result<Option<GeocodingResult>> {
        Ok(self.search(query, 1).await?.into_iter().next())
    }

    /// Get the name of this geocoder implementation
    fn name(&self) -> &'static str;
}

/// Result of geocoding operation
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodingResult {
    pub coordinates: Coordinates,
    /// Display name returned by geocoder
    pub display_name: String,
}

// ==========================================================================
// MockGeocoder Implementation
// ==========================================================================

/// Mock geocoder for testing.
///
/// Without a place table every non-blank query hashes to a stable point in
/// the Bengaluru area. With a table only the listed places resolve.
pub struct MockGeocoder {
    places: Option<BTreeMap<String, Coordinates>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self { places: None }
    }

    /// Only resolve the given places (case-insensitive)
    #[cfg(test)]
    pub fn with_places<'a, I>(places: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Coordinates)>,
    {
        let places = places
            .into_iter()
            .map(|(name, coords)| (name.trim().to_lowercase(), coords))
            .collect();
        Self { places: Some(places) }
    }

    /// Generate deterministic coordinates from the query hash
    fn hash_to_coordinates(query: &str) -> Coordinates {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        query.trim().to_lowercase().hash(&mut hasher);
        let hash = hasher.finish();

        // Greater Bengaluru, inside the ring road
        const LAT_MIN: f64 = 12.85;
        const LAT_MAX: f64 = 13.10;
        const LNG_MIN: f64 = 77.48;
        const LNG_MAX: f64 = 77.75;

        let lat_normalized = ((hash >> 32) as f64) / (u32::MAX as f64);
        let lng_normalized = ((hash & 0xFFFFFFFF) as f64) / (u32::MAX as f64);

        Coordinates {
            lat: LAT_MIN + (lat_normalized * (LAT_MAX - LAT_MIN)),
            lng: LNG_MIN + (lng_normalized * (LNG_MAX - LNG_MIN)),
        }
    }
}

impl Default for MockGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<GeocodingResult>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Ok(vec![]);
        }

        let results = match &self.places {
            None => vec![GeocodingResult {
                coordinates: Self::hash_to_coordinates(&needle),
                display_name: query.trim().to_string(),
            }],
            Some(places) => {
                // Exact match first, then prefix matches in name order
                let exact = places.get(&needle).map(|c| (needle.clone(), *c));
                exact
                    .into_iter()
                    .chain(
                        places
                            .iter()
                            .filter(|(name, _)| **name != needle && name.starts_with(&needle))
                            .map(|(name, c)| (name.clone(), *c)),
                    )
                    .take(limit)
                    .map(|(name, coordinates)| GeocodingResult {
                        coordinates,
                        display_name: name,
                    })
                    .collect()
            }
        };

        Ok(results)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ==========================================================================
// TomTomGeocoder Implementation
// ==========================================================================

pub struct TomTomGeocoder {
    client: TomTomSearchClient,
}

impl TomTomGeocoder {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: TomTomSearchClient::new(base_url, api_key, timeout)?,
        })
    }
}

#[async_trait]
impl Geocoder for TomTomGeocoder {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<GeocodingResult>> {
        let candidates = self.client.fuzzy_search(query, limit).await.map_err(|e| {
            tracing::error!("Geocoding '{}' failed: {}", query, e);
            e
        })?;

        Ok(candidates
            .into_iter()
            .map(|c| GeocodingResult {
                coordinates: c.coordinates,
                display_name: c.address,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "tomtom"
    }
}

// ==========================================================================
// Factory function
// ==========================================================================

/// Create geocoder based on configuration
pub fn create_geocoder(config: &Config) -> Result<Box<dyn Geocoder>> {
    match &config.tomtom_api_key {
        Some(key) => {
            tracing::info!("Using TomTomGeocoder at {}", config.tomtom_base_url);
            Ok(Box::new(TomTomGeocoder::new(
                &config.tomtom_base_url,
                key,
                config.http_timeout(),
            )?))
        }
        None => {
            tracing::warn!("TOMTOM_API_KEY not set, using MockGeocoder");
            Ok(Box::new(MockGeocoder::new()))
        }
    }
}
