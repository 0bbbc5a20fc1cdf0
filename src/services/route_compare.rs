//! Route comparison workflow
//!
//! Turns free-text start/stop/waypoint strings into a fastest and a shortest
//! route:
//! 1. geocode every string (first candidate wins, any miss aborts)
//! 2. clear the previous `route` overlays and place markers
//! 3. route both policies as independent tasks, each writing its own slot
//!
//! Failures never escape: they are logged and returned as notices.

use std::sync::Arc;

use futures::future::try_join_all;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::WorkflowError;
use crate::services::geocoding::{Geocoder, MIN_SUGGEST_QUERY_LEN, SUGGEST_LIMIT};
use crate::services::map_surface::SharedMap;
use crate::services::routing::RoutingService;
use crate::types::{
    Coordinates, LineOverlay, LocationSuggestion, Marker, Notice, RouteComparison,
    RouteDetails, RoutePolicy, RouteSearchOutcome, RouteSearchRequest,
};

/// Overlays carrying this tag are wiped before each new search
pub const ROUTE_OVERLAY_TAG: &str = "route";

const ROUTE_LINE_WIDTH: u32 = 4;
const START_MARKER_COLOR: &str = "green";
const STOP_MARKER_COLOR: &str = "red";
const WAYPOINT_MARKER_COLOR: &str = "blue";

/// Geocoded search input
#[derive(Debug, Clone)]
struct ResolvedLocations {
    start: Coordinates,
    stop: Coordinates,
    waypoints: Vec<Coordinates>,
}

impl ResolvedLocations {
    /// start, waypoints..., stop
    fn chain(&self) -> Vec<Coordinates> {
        let mut chain = Vec::with_capacity(self.waypoints.len() + 2);
        chain.push(self.start);
        chain.extend(self.waypoints.iter().copied());
        chain.push(self.stop);
        chain
    }
}

pub struct RouteComparisonService {
    geocoder: Arc<dyn Geocoder>,
    routing: Arc<dyn RoutingService>,
}

impl RouteComparisonService {
    pub fn new(geocoder: Arc<dyn Geocoder>, routing: Arc<dyn RoutingService>) -> Self {
        Self { geocoder, routing }
    }

    /// Run one search against `map`
    pub async fn compare_routes(&self, map: &SharedMap, request: &RouteSearchRequest) -> RouteSearchOutcome {
        let start = request.start.trim();
        let stop = request.stop.trim();

        if start.is_empty() || stop.is_empty() {
            warn!("Route search rejected: start or stop location missing");
            return Self::outcome(map, RouteDetails::default(), None, vec![WorkflowError::MissingLocations.to_notice()]);
        }

        let waypoints = request.effective_waypoints();
        info!("Route search: '{}' -> '{}' via {} waypoints", start, stop, waypoints.len());

        let resolved = match self.geocode_all(start, stop, &waypoints).await {
            Ok(resolved) => resolved,
            Err(e) => {
                error!("Error geocoding locations: {}", e);
                return Self::outcome(map, RouteDetails::default(), None, vec![e.to_notice()]);
            }
        };

        Self::draw_markers(map, &resolved);

        let details = Arc::new(Mutex::new(RouteDetails::default()));
        let chain = resolved.chain();

        let handles: Vec<_> = RoutePolicy::ALL
            .iter()
            .map(|&policy| {
                let routing = Arc::clone(&self.routing);
                let map = Arc::clone(map);
                let details = Arc::clone(&details);
                let chain = chain.clone();
                (policy, tokio::spawn(route_policy(routing, map, details, chain, policy)))
            })
            .collect();

        let mut notices = Vec::new();
        for (policy, handle) in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => notices.push(e.to_notice()),
                Err(e) => {
                    error!("{} route task failed: {}", policy, e);
                    let err = WorkflowError::Routing { policy, message: e.to_string() };
                    notices.push(err.to_notice());
                }
            }
        }

        let details = details.lock().clone();
        debug!("Route search finished with {} of 2 policies computed", details.computed_count());

        let comparison = RouteComparison::from_details(&details);
        Self::outcome(map, details, Some(comparison), notices)
    }

    /// Autocomplete candidates for a partially typed location
    pub async fn suggest_locations(&self, query: &str) -> anyhow::Result<Vec<LocationSuggestion>> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGEST_QUERY_LEN {
            return Ok(vec![]);
        }

        let results = self.geocoder.search(query, SUGGEST_LIMIT).await?;
        Ok(results
            .into_iter()
            .map(|r| LocationSuggestion {
                address: r.display_name,
                coordinates: r.coordinates,
            })
            .collect())
    }

    async fn geocode_all(
        &self,
        start: &str,
        stop: &str,
        waypoints: &[String],
    ) -> Result<ResolvedLocations, WorkflowError> {
        let queries: Vec<&str> = [start, stop]
            .into_iter()
            .chain(waypoints.iter().map(String::as_str))
            .collect();

        let lookups = queries.into_iter().map(|query| {
            let geocoder = Arc::clone(&self.geocoder);
            async move {
                match geocoder.geocode(query).await {
                    Ok(Some(result)) => {
                        debug!("Geocoded '{}' to {:?}", query, result.coordinates);
                        Ok(result.coordinates)
                    }
                    Ok(None) => Err(WorkflowError::LocationNotFound { query: query.to_string() }),
                    Err(e) => Err(WorkflowError::Geocoding {
                        query: query.to_string(),
                        message: e.to_string(),
                    }),
                }
            }
        });

        let mut coordinates = try_join_all(lookups).await?.into_iter();
        let (start, stop) = match (coordinates.next(), coordinates.next()) {
            (Some(start), Some(stop)) => (start, stop),
            _ => return Err(WorkflowError::MissingLocations),
        };

        Ok(ResolvedLocations {
            start,
            stop,
            waypoints: coordinates.collect(),
        })
    }

    fn draw_markers(map: &SharedMap, resolved: &ResolvedLocations) {
        let mut map = map.lock();
        map.remove_tagged(ROUTE_OVERLAY_TAG);
        map.add_marker(Marker::new("route-marker-start", resolved.start, START_MARKER_COLOR));
        map.add_marker(Marker::new("route-marker-stop", resolved.stop, STOP_MARKER_COLOR));
        for (index, coords) in resolved.waypoints.iter().enumerate() {
            map.add_marker(Marker::new(
                format!("route-marker-waypoint-{}", index + 1),
                *coords,
                WAYPOINT_MARKER_COLOR,
            ));
        }
    }

    fn outcome(
        map: &SharedMap,
        details: RouteDetails,
        comparison: Option<RouteComparison>,
        notices: Vec<Notice>,
    ) -> RouteSearchOutcome {
        RouteSearchOutcome {
            details,
            comparison,
            notices,
            map: map.lock().snapshot(),
        }
    }
}

/// Compute one policy and publish it into its own slot and overlay
async fn route_policy(
    routing: Arc<dyn RoutingService>,
    map: SharedMap,
    details: Arc<Mutex<RouteDetails>>,
    chain: Vec<Coordinates>,
    policy: RoutePolicy,
) -> Result<(), WorkflowError> {
    let route = match routing.calculate_route(&chain, policy, true).await {
        Ok(Some(route)) => route,
        Ok(None) => {
            error!("No {} routes found in the result", policy);
            return Err(WorkflowError::NoRoute { policy });
        }
        Err(e) => {
            error!("Error calculating {} route: {:#}", policy, e);
            return Err(WorkflowError::Routing { policy, message: e.to_string() });
        }
    };

    let distance_km = route.distance_km();
    let travel_time_minutes = route.travel_time_minutes();

    {
        let mut details = details.lock();
        let slot = details.slot_mut(policy);
        slot.distance_km = Some(distance_km);
        slot.travel_time_minutes = Some(travel_time_minutes);
        slot.start = chain.first().copied();
        slot.stop = chain.last().copied();
        slot.waypoints = chain
            .get(1..chain.len().saturating_sub(1))
            .map(<[Coordinates]>::to_vec)
            .unwrap_or_default();
    }

    map.lock().set_line(LineOverlay {
        id: policy.overlay_id(),
        coordinates: route.geometry.coordinates,
        color: policy.line_color().to_string(),
        width: ROUTE_LINE_WIDTH,
    });

    info!("{} route: {:.2} km, {} min", policy, distance_km, travel_time_minutes);
    Ok(())
}
