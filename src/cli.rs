//! CLI argument parsing for the optiroute-worker binary.

use clap::{Parser, Subcommand};

use crate::types::{
    DistanceUnit, EmissionsRequest, FuelType, RouteSearchOutcome, RouteSearchRequest, VehicleType,
};

#[derive(Parser)]
#[command(name = "optiroute-worker", about = "Optiroute route comparison and fleet backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Compare the fastest and shortest route once and print the table
    Route {
        #[arg(long)]
        start: String,
        #[arg(long)]
        stop: String,
        /// Intermediate stop, repeatable
        #[arg(long = "waypoint")]
        waypoints: Vec<String>,
    },
    /// Estimate trip CO2 from two odometer readings
    Co2 {
        #[arg(long)]
        initial: String,
        #[arg(long = "final")]
        final_reading: String,
        #[arg(long, value_enum, default_value_t = DistanceUnit::Km)]
        unit: DistanceUnit,
        #[arg(long, value_enum, default_value_t = VehicleType::Car)]
        vehicle: VehicleType,
        #[arg(long, value_enum, default_value_t = FuelType::Petrol)]
        fuel: FuelType,
    },
    /// Print the fleet table as JSON
    Fleet,
}

impl Command {
    /// Route search for the `route` subcommand
    pub fn route_request(&self) -> Option<RouteSearchRequest> {
        match self {
            Command::Route { start, stop, waypoints } => {
                Some(RouteSearchRequest::new(start.as_str(), stop.as_str()).with_waypoints(waypoints.iter().cloned()))
            }
            _ => None,
        }
    }

    /// Estimator input for the `co2` subcommand
    pub fn emissions_request(&self) -> Option<EmissionsRequest> {
        match self {
            Command::Co2 { initial, final_reading, unit, vehicle, fuel } => Some(EmissionsRequest {
                vehicle_type: *vehicle,
                fuel_type: *fuel,
                initial_odometer: initial.clone(),
                final_odometer: final_reading.clone(),
                distance_unit: *unit,
            }),
            _ => None,
        }
    }
}

/// Comparison table for the `route` subcommand. A search with no computed
/// route is an error so the process exits non-zero.
pub fn route_report(outcome: &RouteSearchOutcome) -> anyhow::Result<String> {
    match &outcome.comparison {
        Some(comparison) if outcome.details.computed_count() > 0 => Ok(comparison.to_string()),
        _ => {
            let messages: Vec<&str> = outcome.notices.iter().map(|n| n.message.as_str()).collect();
            anyhow::bail!("Route search failed: {}", messages.join("; "))
        }
    }
}
