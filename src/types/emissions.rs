//! CO2 estimator types

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Unit the odometer readings are taken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Km,
    Miles,
}

impl DistanceUnit {
    /// Multiplier converting this unit to kilometers
    pub const fn km_factor(self) -> f64 {
        match self {
            DistanceUnit::Km => 1.0,
            DistanceUnit::Miles => 1.60934,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Km => "km",
            DistanceUnit::Miles => "miles",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    Car,
    Van,
    Truck,
    Bus,
}

impl VehicleType {
    /// Consumption factor applied per kilometer
    pub const fn factor(self) -> f64 {
        match self {
            VehicleType::Car => 0.12,
            VehicleType::Van => 0.17,
            VehicleType::Truck => 0.3,
            VehicleType::Bus => 0.05,
        }
    }

    /// Per-trip CO2 figure (kg) above which a warning is raised
    pub const fn threshold_kg(self) -> f64 {
        match self {
            VehicleType::Car => 20.0,
            VehicleType::Van => 35.0,
            VehicleType::Truck => 80.0,
            VehicleType::Bus => 50.0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Van => "van",
            VehicleType::Truck => "truck",
            VehicleType::Bus => "bus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
    Electric,
    Hybrid,
}

impl FuelType {
    /// kg CO2 emitted per unit of fuel burnt
    pub const fn factor(self) -> f64 {
        match self {
            FuelType::Petrol => 2.31,
            FuelType::Diesel => 2.68,
            FuelType::Electric => 0.0,
            FuelType::Hybrid => 1.84,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Electric => "electric",
            FuelType::Hybrid => "hybrid",
        }
    }
}

/// Estimator input, odometer readings as typed by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsRequest {
    #[serde(default)]
    pub vehicle_type: VehicleType,
    #[serde(default)]
    pub fuel_type: FuelType,
    pub initial_odometer: String,
    pub final_odometer: String,
    #[serde(default)]
    pub distance_unit: DistanceUnit,
}

/// Where the CO2 figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionsSource {
    Local,
    Api,
}

/// Estimator result. `error` carries an inline emissions API failure; the
/// distance is kept in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsOutcome {
    pub distance_km: f64,
    pub co2_kg: Option<f64>,
    pub source: EmissionsSource,
    pub threshold_kg: Option<f64>,
    pub over_threshold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emissions_request_defaults() {
        let json = r#"{"initialOdometer": "100", "finalOdometer": "150"}"#;
        let request: EmissionsRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.vehicle_type, VehicleType::Car);
        assert_eq!(request.fuel_type, FuelType::Petrol);
        assert_eq!(request.distance_unit, DistanceUnit::Km);
    }

    #[test]
    fn test_emissions_request_lowercase_enums() {
        let json = r#"{
            "vehicleType": "truck",
            "fuelType": "diesel",
            "initialOdometer": "1000",
            "finalOdometer": "1200",
            "distanceUnit": "miles"
        }"#;
        let request: EmissionsRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.vehicle_type, VehicleType::Truck);
        assert_eq!(request.fuel_type, FuelType::Diesel);
        assert_eq!(request.distance_unit, DistanceUnit::Miles);
    }

    #[test]
    fn test_electric_has_zero_fuel_factor() {
        assert_eq!(FuelType::Electric.factor(), 0.0);
    }
}
