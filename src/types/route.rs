//! Route comparison types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Coordinates, MapSnapshot};

/// Routing objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutePolicy {
    Fastest,
    Shortest,
}

impl RoutePolicy {
    pub const ALL: [RoutePolicy; 2] = [RoutePolicy::Fastest, RoutePolicy::Shortest];

    pub const fn as_str(self) -> &'static str {
        match self {
            RoutePolicy::Fastest => "fastest",
            RoutePolicy::Shortest => "shortest",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RoutePolicy::Fastest => "Fastest",
            RoutePolicy::Shortest => "Shortest",
        }
    }

    /// Id of the line overlay drawn for this policy
    pub fn overlay_id(self) -> String {
        format!("{}-route", self.as_str())
    }

    pub const fn line_color(self) -> &'static str {
        match self {
            RoutePolicy::Fastest => "orange",
            RoutePolicy::Shortest => "green",
        }
    }
}

impl fmt::Display for RoutePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result slot for one policy. `None` fields are not computed yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub distance_km: Option<f64>,
    pub travel_time_minutes: Option<i64>,
    pub start: Option<Coordinates>,
    pub stop: Option<Coordinates>,
    #[serde(default)]
    pub waypoints: Vec<Coordinates>,
}

impl RouteResult {
    pub fn is_computed(&self) -> bool {
        self.distance_km.is_some() && self.travel_time_minutes.is_some()
    }
}

/// Results of both policies, wiped together before every search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDetails {
    pub fastest: RouteResult,
    pub shortest: RouteResult,
}

impl RouteDetails {
    pub fn get(&self, policy: RoutePolicy) -> &RouteResult {
        match policy {
            RoutePolicy::Fastest => &self.fastest,
            RoutePolicy::Shortest => &self.shortest,
        }
    }

    pub fn slot_mut(&mut self, policy: RoutePolicy) -> &mut RouteResult {
        match policy {
            RoutePolicy::Fastest => &mut self.fastest,
            RoutePolicy::Shortest => &mut self.shortest,
        }
    }

    /// Number of policies with a populated result
    pub fn computed_count(&self) -> usize {
        RoutePolicy::ALL
            .iter()
            .filter(|p| self.get(**p).is_computed())
            .count()
    }
}

/// Route search input. Blank waypoints are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSearchRequest {
    /// Map session to draw on; the default session is used when absent
    #[serde(default)]
    pub session_id: Option<String>,
    pub start: String,
    pub stop: String,
    #[serde(default)]
    pub waypoints: Vec<String>,
}

impl RouteSearchRequest {
    pub fn new(start: impl Into<String>, stop: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            stop: stop.into(),
            ..Default::default()
        }
    }

    pub fn with_waypoints<I, S>(mut self, waypoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.waypoints = waypoints.into_iter().map(Into::into).collect();
        self
    }

    /// Waypoints in order, trimmed, blanks dropped
    pub fn effective_waypoints(&self) -> Vec<String> {
        self.waypoints.iter().map(String::as_str).collect::<WaypointList>().filled()
    }
}

/// Waypoint inputs in entry order, each named `waypoint-<index>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaypointList {
    entries: Vec<(String, String)>,
}

impl WaypointList {
    /// Append a waypoint and return the id it was given
    pub fn add(&mut self, value: impl Into<String>) -> &str {
        let id = format!("waypoint-{}", self.entries.len());
        self.entries.push((id, value.into()));
        self.entries.last().map(|(id, _)| id.as_str()).unwrap_or_default()
    }

    /// Trimmed values of the non-blank entries, in order
    pub fn filled(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for WaypointList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::default();
        for value in iter {
            list.add(value);
        }
        list
    }
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Validation,
    Geocoding,
    Routing,
}

/// A message to show the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One row of the comparison table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub route_type: String,
    pub distance_km: String,
    pub travel_time_minutes: String,
}

/// Human readable route comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteComparison {
    pub rows: Vec<ComparisonRow>,
}

const NOT_AVAILABLE: &str = "N/A";

impl RouteComparison {
    pub fn from_details(details: &RouteDetails) -> Self {
        let rows = RoutePolicy::ALL
            .iter()
            .map(|policy| {
                let result = details.get(*policy);
                ComparisonRow {
                    route_type: policy.label().to_string(),
                    distance_km: result
                        .distance_km
                        .map(|d| format!("{:.2}", d))
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                    travel_time_minutes: result
                        .travel_time_minutes
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                }
            })
            .collect();

        Self { rows }
    }
}

impl fmt::Display for RouteComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<10} {:>14} {:>22}", "Route Type", "Distance (km)", "Estimated Time (mins)")?;
        for row in &self.rows {
            writeln!(f, "{:<10} {:>14} {:>22}", row.route_type, row.distance_km, row.travel_time_minutes)?;
        }
        Ok(())
    }
}

/// Everything a route search produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSearchOutcome {
    pub details: RouteDetails,
    pub comparison: Option<RouteComparison>,
    pub notices: Vec<Notice>,
    pub map: MapSnapshot,
}

/// Autocomplete request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub query: String,
}

/// Autocomplete candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSuggestion {
    pub address: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    pub items: Vec<LocationSuggestion>,
}
