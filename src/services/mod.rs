//! Business logic services

pub mod emissions;
pub mod fleet;
pub mod geo;
pub mod geocoding;
pub mod map_surface;
pub mod route_compare;
pub mod routing;
pub mod tomtom_search;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use emissions::EmissionsEstimator;
use fleet::FleetRegistry;
use geocoding::{create_geocoder, Geocoder};
use map_surface::MapSessions;
use route_compare::RouteComparisonService;
use routing::{create_routing_service, RoutingService};

/// Everything the NATS handlers and the one-shot CLI commands share
pub struct Services {
    pub route_compare: Arc<RouteComparisonService>,
    pub map_sessions: Arc<MapSessions>,
    pub emissions: Arc<EmissionsEstimator>,
    pub fleet: Arc<FleetRegistry>,
    pub geocoder_name: String,
    pub routing_name: String,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        let geocoder: Arc<dyn Geocoder> = Arc::from(create_geocoder(config)?);
        info!("Geocoder initialized: {}", geocoder.name());

        let routing: Arc<dyn RoutingService> = Arc::from(create_routing_service(config)?);
        info!("Routing service initialized: {}", routing.name());

        Ok(Self {
            geocoder_name: geocoder.name().to_string(),
            routing_name: routing.name().to_string(),
            route_compare: Arc::new(RouteComparisonService::new(geocoder, routing)),
            map_sessions: Arc::new(MapSessions::new()),
            emissions: Arc::new(EmissionsEstimator::from_config(config)?),
            fleet: Arc::new(FleetRegistry::seeded()),
        })
    }
}
