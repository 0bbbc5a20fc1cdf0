//! Routing service for per-policy route calculation
//!
//! Uses TomTom for production, mock for tests.

mod tomtom;

pub use tomtom::TomTomRoutingClient;

use async_trait::async_trait;
use anyhow::Result;

use crate::config::Config;
use crate::services::geo::chain_distance;
use crate::types::{Coordinates, RoutePolicy};

/// Route geometry as GeoJSON coordinates
/// Coordinates are in [longitude, latitude] order (GeoJSON standard)
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct RouteGeometry {
    /// Array of [lng, lat] coordinates forming the route polyline
    pub coordinates: Vec<[f64; 2]>,
}

impl RouteGeometry {
    /// Create geometry from a list of coordinates (straight lines)
    pub fn from_coordinates(coords: &[Coordinates]) -> Self {
        Self {
            coordinates: coords.iter().map(Coordinates::lng_lat).collect(),
        }
    }
}

/// One computed route
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedRoute {
    pub length_in_meters: u64,
    pub travel_time_in_seconds: u64,
    pub geometry: RouteGeometry,
}

impl CalculatedRoute {
    pub fn distance_km(&self) -> f64 {
        self.length_in_meters as f64 / 1000.0
    }

    /// Travel time rounded to whole minutes
    pub fn travel_time_minutes(&self) -> i64 {
        (self.travel_time_in_seconds as f64 / 60.0).round() as i64
    }
}

/// Routing service trait for abstraction (TomTom, mock, etc.)
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Route through `locations` in the given order.
    /// Returns None when the service has no route for them.
    async fn calculate_route(
        &self,
        locations: &[Coordinates],
        policy: RoutePolicy,
        traffic: bool,
    ) -> Result<Option<CalculatedRoute>>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

/// Mock routing service for tests
/// Uses Haversine distance × per-policy coefficient for estimation
pub struct MockRoutingService {
    /// Straight-line to road distance coefficient for (fastest, shortest)
    road_coefficients: (f64, f64),
    /// Average speed in km/h for (fastest, shortest)
    average_speeds_kmh: (f64, f64),
    /// Travel time multiplier applied when traffic is requested
    traffic_factor: f64,
}

impl Default for MockRoutingService {
    fn default() -> Self {
        // Fastest takes longer roads at higher speed, shortest the opposite
        Self {
            road_coefficients: (1.35, 1.2),
            average_speeds_kmh: (45.0, 30.0),
            traffic_factor: 1.2,
        }
    }
}

impl MockRoutingService {
    pub fn new() -> Self {
        Self::default()
    }

    fn params(&self, policy: RoutePolicy) -> (f64, f64) {
        match policy {
            RoutePolicy::Fastest => (self.road_coefficients.0, self.average_speeds_kmh.0),
            RoutePolicy::Shortest => (self.road_coefficients.1, self.average_speeds_kmh.1),
        }
    }
}

#[async_trait]
impl RoutingService for MockRoutingService {
    async fn calculate_route(
        &self,
        locations: &[Coordinates],
        policy: RoutePolicy,
        traffic: bool,
    ) -> Result<Option<CalculatedRoute>> {
        if locations.len() < 2 {
            return Ok(None);
        }

        let (coefficient, speed_kmh) = self.params(policy);
        let road_km = chain_distance(locations) * coefficient;
        let mut hours = road_km / speed_kmh;
        if traffic {
            hours *= self.traffic_factor;
        }

        Ok(Some(CalculatedRoute {
            length_in_meters: (road_km * 1000.0).round() as u64,
            travel_time_in_seconds: (hours * 3600.0).round() as u64,
            geometry: RouteGeometry::from_coordinates(locations),
        }))
    }

    fn name(&self) -> &str {
        "MockRouting"
    }
}

/// Create routing service based on configuration
pub fn create_routing_service(config: &Config) -> Result<Box<dyn RoutingService>> {
    use tracing::{info, warn};

    match &config.tomtom_api_key {
        Some(key) => {
            info!("TomTom routing service at {}", config.tomtom_base_url);
            Ok(Box::new(TomTomRoutingClient::new(
                &config.tomtom_base_url,
                key,
                config.http_timeout(),
            )?))
        }
        None => {
            warn!("TOMTOM_API_KEY not set, using mock routing service");
            Ok(Box::new(MockRoutingService::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn majestic() -> Coordinates {
        Coordinates { lat: 12.9767, lng: 77.5713 }
    }

    fn whitefield() -> Coordinates {
        Coordinates { lat: 12.9698, lng: 77.7500 }
    }

    fn hebbal() -> Coordinates {
        Coordinates { lat: 13.0358, lng: 77.5970 }
    }

    #[tokio::test]
    async fn test_mock_routing_needs_two_locations() {
        let service = MockRoutingService::new();
        let route = service
            .calculate_route(&[majestic()], RoutePolicy::Fastest, true)
            .await
            .unwrap();
        assert!(route.is_none());
    }

    #[tokio::test]
    async fn test_mock_routing_two_locations() {
        let service = MockRoutingService::new();
        let route = service
            .calculate_route(&[majestic(), whitefield()], RoutePolicy::Fastest, false)
            .await
            .unwrap()
            .unwrap();

        // ~19 km straight line, ~26 km road
        let km = route.distance_km();
        assert!(km > 20.0 && km < 32.0, "Expected ~26 km, got {} km", km);
        assert_eq!(route.geometry.coordinates.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_routing_policies_differ() {
        let service = MockRoutingService::new();
        let locations = [majestic(), hebbal(), whitefield()];

        let fastest = service
            .calculate_route(&locations, RoutePolicy::Fastest, true)
            .await
            .unwrap()
            .unwrap();
        let shortest = service
            .calculate_route(&locations, RoutePolicy::Shortest, true)
            .await
            .unwrap()
            .unwrap();

        assert!(shortest.length_in_meters < fastest.length_in_meters);
        assert!(fastest.travel_time_in_seconds < shortest.travel_time_in_seconds);
    }

    #[tokio::test]
    async fn test_mock_routing_traffic_slows_down() {
        let service = MockRoutingService::new();
        let locations = [majestic(), whitefield()];

        let free = service
            .calculate_route(&locations, RoutePolicy::Fastest, false)
            .await
            .unwrap()
            .unwrap();
        let busy = service
            .calculate_route(&locations, RoutePolicy::Fastest, true)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(free.length_in_meters, busy.length_in_meters);
        assert!(busy.travel_time_in_seconds > free.travel_time_in_seconds);
    }

    #[tokio::test]
    async fn test_mock_routing_identical_points_is_zero_length() {
        let service = MockRoutingService::new();
        let route = service
            .calculate_route(&[majestic(), majestic()], RoutePolicy::Shortest, true)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(route.length_in_meters, 0);
        assert_eq!(route.travel_time_in_seconds, 0);
    }

    #[test]
    fn test_calculated_route_unit_conversion() {
        let route = CalculatedRoute {
            length_in_meters: 14_236,
            travel_time_in_seconds: 1_889,
            geometry: RouteGeometry::default(),
        };

        assert!((route.distance_km() - 14.236).abs() < 1e-9);
        // 31.48 minutes rounds to 31
        assert_eq!(route.travel_time_minutes(), 31);
    }

    #[test]
    fn test_route_geometry_from_coordinates_is_lng_lat() {
        let geometry = RouteGeometry::from_coordinates(&[majestic()]);
        assert_eq!(geometry.coordinates[0], [77.5713, 12.9767]);
        assert_eq!(geometry.coordinates.len(), 1);
    }

    #[test]
    fn test_routing_service_name() {
        let mock = MockRoutingService::new();
        assert_eq!(mock.name(), "MockRouting");
    }

    #[test]
    fn test_create_routing_service_without_key() {
        let service = create_routing_service(&Config::for_tests()).unwrap();
        assert_eq!(service.name(), "MockRouting");
    }

    #[test]
    fn test_create_routing_service_with_key() {
        let config = Config {
            tomtom_api_key: Some("key".to_string()),
            ..Config::for_tests()
        };
        let service = create_routing_service(&config).unwrap();
        assert_eq!(service.name(), "TomTom");
    }
}
