//! Map overlay types
//!
//! The front-end draws whatever the worker reports in a [`MapSnapshot`].
//! Positions are GeoJSON ordered (`[lng, lat]`).

use serde::{Deserialize, Serialize};

use super::Coordinates;

/// A point marker on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub id: String,
    pub position: [f64; 2],
    pub color: String,
}

impl Marker {
    pub fn new(id: impl Into<String>, coordinates: Coordinates, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: coordinates.lng_lat(),
            color: color.into(),
        }
    }
}

/// A styled polyline overlay, addressed by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineOverlay {
    pub id: String,
    pub coordinates: Vec<[f64; 2]>,
    pub color: String,
    pub width: u32,
}

/// Everything currently drawn on a map surface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    /// Initial view center, `[lng, lat]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub lines: Vec<LineOverlay>,
}

impl MapSnapshot {
    /// Ids of all overlays, markers first
    #[cfg(test)]
    pub fn overlay_ids(&self) -> Vec<&str> {
        self.markers
            .iter()
            .map(|m| m.id.as_str())
            .chain(self.lines.iter().map(|l| l.id.as_str()))
            .collect()
    }
}
