//! CO2 emissions estimator
//!
//! Distance comes from two odometer readings. The CO2 figure comes from the
//! configured emissions API when there is one, from the local factor table
//! otherwise. Either figure is checked against a per-vehicle threshold.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::EstimateError;
use crate::services::geo::round2;
use crate::types::{
    DistanceUnit, EmissionsOutcome, EmissionsRequest, EmissionsSource, FuelType, VehicleType,
};

/// Distance between two odometer readings in kilometers, rounded to 2 dp
pub fn odometer_distance_km(
    initial: &str,
    final_reading: &str,
    unit: DistanceUnit,
) -> Result<f64, EstimateError> {
    raw_distance_km(initial, final_reading, unit).map(round2)
}

/// Unrounded kilometers; CO2 is computed from this, not the display value
fn raw_distance_km(initial: &str, final_reading: &str, unit: DistanceUnit) -> Result<f64, EstimateError> {
    let initial = parse_reading(initial)?;
    let final_reading = parse_reading(final_reading)?;

    if final_reading <= initial {
        return Err(EstimateError::NonIncreasing { initial, final_reading });
    }

    Ok((final_reading - initial) * unit.km_factor())
}

fn parse_reading(raw: &str) -> Result<f64, EstimateError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(EstimateError::MissingReading);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EstimateError::InvalidReading(raw.to_string()))
}

/// kg CO2 from the local factor table, rounded to 2 dp
pub fn estimate_local(distance_km: f64, vehicle: VehicleType, fuel: FuelType) -> f64 {
    round2(distance_km * vehicle.factor() * fuel.factor())
}

/// Payload sent to the emissions API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsQuery {
    pub vehicle_type: VehicleType,
    pub fuel_type: FuelType,
    pub distance_value: f64,
    pub distance_unit: DistanceUnit,
}

#[async_trait]
pub trait EmissionsApi: Send + Sync {
    /// Estimated CO2 mass in kg
    async fn estimate(&self, query: &EmissionsQuery) -> Result<f64>;

    fn name(&self) -> &str;
}

/// JSON-over-HTTP emissions endpoint
pub struct HttpEmissionsClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpEmissionsClient {
    pub fn new(url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
            api_key,
        })
    }
}

/// Pull the `co2e` figure out of an API response body
fn parse_co2e(body: &serde_json::Value) -> Result<f64> {
    body.get("co2e")
        .and_then(serde_json::Value::as_f64)
        .context("Emissions API response is missing the 'co2e' field")
}

#[async_trait]
impl EmissionsApi for HttpEmissionsClient {
    async fn estimate(&self, query: &EmissionsQuery) -> Result<f64> {
        let mut request = self.client.post(&self.url).json(query);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("Failed to send emissions request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Emissions API returned error {}: {}", status, body);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse emissions response")?;

        parse_co2e(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}

pub struct EmissionsEstimator {
    api: Option<Arc<dyn EmissionsApi>>,
}

impl EmissionsEstimator {
    pub fn new(api: Option<Arc<dyn EmissionsApi>>) -> Self {
        Self { api }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api: Option<Arc<dyn EmissionsApi>> = match &config.emissions_api_url {
            Some(url) => {
                info!("Emissions API at {}", url);
                Some(Arc::new(HttpEmissionsClient::new(
                    url,
                    config.emissions_api_key.clone(),
                    config.http_timeout(),
                )?))
            }
            None => {
                info!("EMISSIONS_API_URL not set, using local emission factors");
                None
            }
        };
        Ok(Self::new(api))
    }

    /// Validate the readings, then estimate. Input errors return `Err`
    /// before any network call; API failures are reported in the outcome.
    pub async fn estimate(&self, request: &EmissionsRequest) -> Result<EmissionsOutcome, EstimateError> {
        let raw_km = raw_distance_km(
            &request.initial_odometer,
            &request.final_odometer,
            request.distance_unit,
        )?;
        let distance_km = round2(raw_km);
        debug!(
            "Odometer distance: {} km ({} readings), {} on {}",
            raw_km,
            request.distance_unit.as_str(),
            request.vehicle_type.as_str(),
            request.fuel_type.as_str()
        );

        let Some(api) = &self.api else {
            let co2_kg = estimate_local(raw_km, request.vehicle_type, request.fuel_type);
            return Ok(with_threshold(distance_km, co2_kg, EmissionsSource::Local, request.vehicle_type));
        };

        let query = EmissionsQuery {
            vehicle_type: request.vehicle_type,
            fuel_type: request.fuel_type,
            distance_value: raw_km,
            distance_unit: DistanceUnit::Km,
        };

        match api.estimate(&query).await {
            Ok(co2_kg) => Ok(with_threshold(distance_km, round2(co2_kg), EmissionsSource::Api, request.vehicle_type)),
            Err(e) => {
                warn!("Emissions API ({}) failed: {:#}", api.name(), e);
                Ok(EmissionsOutcome {
                    distance_km,
                    co2_kg: None,
                    source: EmissionsSource::Api,
                    threshold_kg: None,
                    over_threshold: false,
                    warning: None,
                    error: Some(format!("Could not fetch emissions estimate: {}", e)),
                })
            }
        }
    }
}

fn with_threshold(
    distance_km: f64,
    co2_kg: f64,
    source: EmissionsSource,
    vehicle: VehicleType,
) -> EmissionsOutcome {
    let threshold = vehicle.threshold_kg();
    let over_threshold = co2_kg > threshold;
    let warning = over_threshold.then(|| {
        format!(
            "{} kg CO2 exceeds the {} kg threshold for a {}",
            co2_kg,
            threshold,
            vehicle.as_str()
        )
    });

    EmissionsOutcome {
        distance_km,
        co2_kg: Some(co2_kg),
        source,
        threshold_kg: Some(threshold),
        over_threshold,
        warning,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingApi {
        calls: Arc<AtomicUsize>,
        response: std::result::Result<f64, String>,
    }

    impl CountingApi {
        fn returning(value: f64) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (Self { calls: Arc::clone(&calls), response: Ok(value) }, calls)
        }

        fn failing(message: &str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (Self { calls: Arc::clone(&calls), response: Err(message.to_string()) }, calls)
        }
    }

    #[async_trait]
    impl EmissionsApi for CountingApi {
        async fn estimate(&self, _query: &EmissionsQuery) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().map_err(anyhow::Error::msg)
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn request(initial: &str, final_reading: &str, unit: DistanceUnit) -> EmissionsRequest {
        EmissionsRequest {
            vehicle_type: VehicleType::Car,
            fuel_type: FuelType::Petrol,
            initial_odometer: initial.to_string(),
            final_odometer: final_reading.to_string(),
            distance_unit: unit,
        }
    }

    #[test]
    fn test_miles_example() {
        let km = odometer_distance_km("100", "150", DistanceUnit::Miles).unwrap();
        assert_eq!(km, 80.47);
    }

    #[test]
    fn test_distance_matches_formula_for_increasing_pairs() {
        let pairs = [(0.0, 1.0), (12.5, 99.75), (1000.0, 1234.56), (5.0, 5.01)];
        for (initial, final_reading) in pairs {
            for unit in [DistanceUnit::Km, DistanceUnit::Miles] {
                let km = odometer_distance_km(&initial.to_string(), &final_reading.to_string(), unit).unwrap();
                let expected = ((final_reading - initial) * unit.km_factor() * 100.0).round() / 100.0;
                assert_eq!(km, expected, "{} -> {} {:?}", initial, final_reading, unit);
            }
        }
    }

    #[test]
    fn test_equal_or_decreasing_readings_are_rejected() {
        assert!(matches!(
            odometer_distance_km("150", "150", DistanceUnit::Km),
            Err(EstimateError::NonIncreasing { .. })
        ));
        assert!(matches!(
            odometer_distance_km("200", "150", DistanceUnit::Km),
            Err(EstimateError::NonIncreasing { .. })
        ));
    }

    #[test]
    fn test_non_numeric_and_missing_readings() {
        assert_eq!(
            odometer_distance_km("abc", "150", DistanceUnit::Km),
            Err(EstimateError::InvalidReading("abc".to_string()))
        );
        assert_eq!(
            odometer_distance_km("100", "  ", DistanceUnit::Km),
            Err(EstimateError::MissingReading)
        );
        assert!(odometer_distance_km("NaN", "150", DistanceUnit::Km).is_err());
    }

    #[test]
    fn test_estimate_local_uses_both_factors() {
        // 100 km * 0.3 (truck) * 2.68 (diesel)
        assert_eq!(estimate_local(100.0, VehicleType::Truck, FuelType::Diesel), 80.4);
        assert_eq!(estimate_local(100.0, VehicleType::Car, FuelType::Electric), 0.0);
    }

    #[tokio::test]
    async fn test_local_estimate_without_api() {
        let estimator = EmissionsEstimator::new(None);

        let outcome = estimator.estimate(&request("100", "150", DistanceUnit::Km)).await.unwrap();

        assert_eq!(outcome.distance_km, 50.0);
        // 50 * 0.12 * 2.31
        assert_eq!(outcome.co2_kg, Some(13.86));
        assert_eq!(outcome.source, EmissionsSource::Local);
        assert!(!outcome.over_threshold);
        assert!(outcome.warning.is_none());
    }

    #[tokio::test]
    async fn test_co2_uses_unrounded_distance() {
        let estimator = EmissionsEstimator::new(None);
        let mut van = request("0", "0.37", DistanceUnit::Miles);
        van.vehicle_type = VehicleType::Van;

        let outcome = estimator.estimate(&van).await.unwrap();

        // 0.5954558 km shown as 0.6, but 0.6 * 0.17 * 2.31 would round to 0.24
        assert_eq!(outcome.distance_km, 0.6);
        assert_eq!(outcome.co2_kg, Some(0.23));
    }

    #[tokio::test]
    async fn test_invalid_input_never_calls_api() {
        let (api, calls) = CountingApi::returning(10.0);
        let estimator = EmissionsEstimator::new(Some(Arc::new(api)));

        let same = estimator.estimate(&request("150", "150", DistanceUnit::Km)).await;
        let backwards = estimator.estimate(&request("200", "150", DistanceUnit::Miles)).await;

        assert!(same.is_err());
        assert!(backwards.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_api_figure_over_threshold_warns() {
        let (api, calls) = CountingApi::returning(25.456);
        let estimator = EmissionsEstimator::new(Some(Arc::new(api)));

        let outcome = estimator.estimate(&request("100", "300", DistanceUnit::Km)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.source, EmissionsSource::Api);
        assert_eq!(outcome.co2_kg, Some(25.46));
        assert_eq!(outcome.threshold_kg, Some(20.0));
        assert!(outcome.over_threshold);
        assert!(outcome.warning.unwrap().contains("threshold"));
    }

    #[tokio::test]
    async fn test_api_failure_keeps_distance() {
        let (api, _) = CountingApi::failing("503 Service Unavailable");
        let estimator = EmissionsEstimator::new(Some(Arc::new(api)));

        let outcome = estimator.estimate(&request("100", "150", DistanceUnit::Miles)).await.unwrap();

        assert_eq!(outcome.distance_km, 80.47);
        assert!(outcome.co2_kg.is_none());
        assert!(outcome.error.unwrap().contains("503"));
    }

    #[test]
    fn test_parse_co2e() {
        let body = serde_json::json!({"co2e": 12.5, "co2e_unit": "kg"});
        assert_eq!(parse_co2e(&body).unwrap(), 12.5);

        let missing = serde_json::json!({"estimate": 12.5});
        assert!(parse_co2e(&missing).is_err());
    }

    #[test]
    fn test_emissions_query_serializes_camel_case() {
        let query = EmissionsQuery {
            vehicle_type: VehicleType::Van,
            fuel_type: FuelType::Hybrid,
            distance_value: 42.0,
            distance_unit: DistanceUnit::Km,
        };

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["vehicleType"], "van");
        assert_eq!(json["fuelType"], "hybrid");
        assert_eq!(json["distanceValue"], 42.0);
        assert_eq!(json["distanceUnit"], "km");
    }

    #[test]
    fn test_from_config_without_url_is_local() {
        let estimator = EmissionsEstimator::from_config(&Config::for_tests()).unwrap();
        assert!(estimator.api.is_none());
    }
}
