//! NATS message handlers

pub mod emissions;
pub mod fleet;
pub mod ping;
pub mod route;

use std::sync::Arc;

use anyhow::Result;
use async_nats::Client;
use tokio::select;
use tracing::{error, info};

use crate::services::Services;

pub const SUBJECT_PING: &str = "optiroute.ping";
pub const SUBJECT_ROUTE_COMPARE: &str = "optiroute.route.compare";
pub const SUBJECT_GEOCODE_SUGGEST: &str = "optiroute.geocode.suggest";
pub const SUBJECT_CO2_ESTIMATE: &str = "optiroute.co2.estimate";
pub const SUBJECT_FLEET_LIST: &str = "optiroute.fleet.list";
pub const SUBJECT_FLEET_CREATE: &str = "optiroute.fleet.create";

/// Start all message handlers
pub async fn start_handlers(client: Client, services: Services) -> Result<()> {
    info!("Starting message handlers...");

    // Subscribe to all subjects
    let ping_sub = client.subscribe(SUBJECT_PING).await?;
    let route_compare_sub = client.subscribe(SUBJECT_ROUTE_COMPARE).await?;
    let geocode_suggest_sub = client.subscribe(SUBJECT_GEOCODE_SUGGEST).await?;
    let co2_estimate_sub = client.subscribe(SUBJECT_CO2_ESTIMATE).await?;
    let fleet_list_sub = client.subscribe(SUBJECT_FLEET_LIST).await?;
    let fleet_create_sub = client.subscribe(SUBJECT_FLEET_CREATE).await?;

    info!("Subscribed to NATS subjects");

    // Spawn handlers
    let client_ping = client.clone();
    let geocoder_name = services.geocoder_name.clone();
    let routing_name = services.routing_name.clone();
    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub, geocoder_name, routing_name).await
    });

    let client_route_compare = client.clone();
    let route_compare = Arc::clone(&services.route_compare);
    let map_sessions = Arc::clone(&services.map_sessions);
    let route_compare_handle = tokio::spawn(async move {
        route::handle_compare(client_route_compare, route_compare_sub, route_compare, map_sessions).await
    });

    let client_geocode_suggest = client.clone();
    let route_compare = Arc::clone(&services.route_compare);
    let geocode_suggest_handle = tokio::spawn(async move {
        route::handle_suggest(client_geocode_suggest, geocode_suggest_sub, route_compare).await
    });

    let client_co2_estimate = client.clone();
    let estimator = Arc::clone(&services.emissions);
    let co2_estimate_handle = tokio::spawn(async move {
        emissions::handle_estimate(client_co2_estimate, co2_estimate_sub, estimator).await
    });

    let client_fleet_list = client.clone();
    let fleet_registry = Arc::clone(&services.fleet);
    let fleet_list_handle = tokio::spawn(async move {
        fleet::handle_list(client_fleet_list, fleet_list_sub, fleet_registry).await
    });

    let client_fleet_create = client.clone();
    let fleet_registry = Arc::clone(&services.fleet);
    let fleet_create_handle = tokio::spawn(async move {
        fleet::handle_create(client_fleet_create, fleet_create_sub, fleet_registry).await
    });

    info!("All handlers started");

    // Wait for any handler to finish (which would indicate an error)
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = route_compare_handle => {
            error!("Route compare handler finished: {:?}", result);
        }
        result = geocode_suggest_handle => {
            error!("Geocode suggest handler finished: {:?}", result);
        }
        result = co2_estimate_handle => {
            error!("CO2 estimate handler finished: {:?}", result);
        }
        result = fleet_list_handle => {
            error!("Fleet list handler finished: {:?}", result);
        }
        result = fleet_create_handle => {
            error!("Fleet create handler finished: {:?}", result);
        }
    }

    Ok(())
}
