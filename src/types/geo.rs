//! Geographic primitives

use serde::{Deserialize, Serialize};

/// WGS84 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[cfg(test)]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// GeoJSON position order
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}
