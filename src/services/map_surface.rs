//! Map rendering surface
//!
//! A map is an explicitly owned handle (`SharedMap`) that the route workflow
//! draws on. Overlays are addressed by id so one policy's line can be
//! replaced without touching the other. `MapSessions` keeps one surface per
//! front-end session so repeated searches reuse the same map.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::types::{Coordinates, LineOverlay, MapSnapshot, Marker};

/// Bengaluru city center
pub const DEFAULT_CENTER: Coordinates = Coordinates { lat: 12.9716, lng: 77.5946 };
pub const DEFAULT_ZOOM: u8 = 12;

const DEFAULT_SESSION: &str = "default";

pub trait MapSurface: Send {
    /// Place a marker, replacing any overlay with the same id
    fn add_marker(&mut self, marker: Marker);

    /// Add or replace the line overlay with the same id
    fn set_line(&mut self, line: LineOverlay);

    /// Remove every overlay whose id contains `tag`. Returns how many went.
    fn remove_tagged(&mut self, tag: &str) -> usize;

    fn snapshot(&self) -> MapSnapshot;
}

pub type SharedMap = Arc<Mutex<dyn MapSurface>>;

pub fn new_shared_map() -> SharedMap {
    Arc::new(Mutex::new(OverlayMap::new()))
}

/// In-memory overlay model
#[derive(Debug, Clone)]
pub struct OverlayMap {
    center: Coordinates,
    zoom: u8,
    markers: Vec<Marker>,
    lines: Vec<LineOverlay>,
}

impl OverlayMap {
    pub fn new() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            markers: Vec::new(),
            lines: Vec::new(),
        }
    }
}

impl Default for OverlayMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSurface for OverlayMap {
    fn add_marker(&mut self, marker: Marker) {
        self.markers.retain(|m| m.id != marker.id);
        self.markers.push(marker);
    }

    fn set_line(&mut self, line: LineOverlay) {
        match self.lines.iter_mut().find(|l| l.id == line.id) {
            Some(existing) => *existing = line,
            None => self.lines.push(line),
        }
    }

    fn remove_tagged(&mut self, tag: &str) -> usize {
        let before = self.markers.len() + self.lines.len();
        self.markers.retain(|m| !m.id.contains(tag));
        self.lines.retain(|l| !l.id.contains(tag));
        let removed = before - (self.markers.len() + self.lines.len());
        debug!("Removed {} overlays tagged '{}'", removed, tag);
        removed
    }

    fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            center: self.center.lng_lat(),
            zoom: self.zoom,
            markers: self.markers.clone(),
            lines: self.lines.clone(),
        }
    }
}

/// One map surface per front-end session, created on first use
#[derive(Default)]
pub struct MapSessions {
    maps: Mutex<HashMap<String, SharedMap>>,
}

impl MapSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&self, session_id: Option<&str>) -> SharedMap {
        let key = session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION);

        let mut maps = self.maps.lock();
        maps.entry(key.to_string())
            .or_insert_with(|| {
                debug!("Creating map surface for session '{}'", key);
                new_shared_map()
            })
            .clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.maps.lock().len()
    }
}
