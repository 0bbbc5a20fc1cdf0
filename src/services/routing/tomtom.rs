//! TomTom routing client
//!
//! TomTom Routing API documentation:
//! https://developer.tomtom.com/routing-api/documentation/routing/calculate-route

use std::time::Duration;

use async_trait::async_trait;
use anyhow::{Result, Context};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{Coordinates, RoutePolicy};
use super::{CalculatedRoute, RouteGeometry, RoutingService};

/// TomTom routing client
pub struct TomTomRoutingClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TomTomRoutingClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Build the calculateRoute URL; locations are `lat,lon` joined by `:`
    pub fn build_route_url(&self, locations: &[Coordinates], policy: RoutePolicy, traffic: bool) -> String {
        let path = locations
            .iter()
            .map(|c| format!("{},{}", c.lat, c.lng))
            .collect::<Vec<_>>()
            .join(":");

        format!(
            "{}/routing/1/calculateRoute/{}/json?key={}&routeType={}&traffic={}&travelMode=car",
            self.base_url,
            path,
            urlencoding::encode(&self.api_key),
            policy.as_str(),
            traffic
        )
    }
}

#[async_trait]
impl RoutingService for TomTomRoutingClient {
    async fn calculate_route(
        &self,
        locations: &[Coordinates],
        policy: RoutePolicy,
        traffic: bool,
    ) -> Result<Option<CalculatedRoute>> {
        if locations.len() < 2 {
            return Ok(None);
        }

        let url = self.build_route_url(locations, policy, traffic);
        debug!("Requesting {} route from TomTom for {} locations", policy, locations.len());

        let response = self.client
            .get(&url)
            .send()
            .await
            .context("Failed to send route request to TomTom")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::BAD_REQUEST && body.contains("NO_ROUTE_FOUND") {
                warn!("TomTom found no {} route", policy);
                return Ok(None);
            }
            anyhow::bail!("TomTom route returned error {}: {}", status, body);
        }

        let route_response: CalculateRouteResponse = response
            .json()
            .await
            .context("Failed to parse TomTom route response")?;

        let route = route_response.into_first_route();
        if let Some(ref r) = route {
            debug!("Received {} route: {} m, {} s, {} points",
                   policy, r.length_in_meters, r.travel_time_in_seconds, r.geometry.coordinates.len());
        }

        Ok(route)
    }

    fn name(&self) -> &str {
        "TomTom"
    }
}

// TomTom API types

#[derive(Debug, Deserialize)]
struct CalculateRouteResponse {
    #[serde(default)]
    routes: Vec<TomTomRoute>,
}

#[derive(Debug, Deserialize)]
struct TomTomRoute {
    summary: RouteSummary,
    #[serde(default)]
    legs: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteSummary {
    length_in_meters: u64,
    travel_time_in_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct RouteLeg {
    #[serde(default)]
    points: Vec<LegPoint>,
}

#[derive(Debug, Deserialize)]
struct LegPoint {
    latitude: f64,
    longitude: f64,
}

impl CalculateRouteResponse {
    /// First candidate route with all legs joined into one polyline
    fn into_first_route(self) -> Option<CalculatedRoute> {
        let route = self.routes.into_iter().next()?;

        let mut coordinates: Vec<[f64; 2]> = Vec::new();
        for (i, leg) in route.legs.into_iter().enumerate() {
            let points = leg.points.into_iter().map(|p| [p.longitude, p.latitude]);
            // Subsequent legs start where the previous one ended
            if i == 0 {
                coordinates.extend(points);
            } else {
                coordinates.extend(points.skip(1));
            }
        }

        Some(CalculatedRoute {
            length_in_meters: route.summary.length_in_meters,
            travel_time_in_seconds: route.summary.travel_time_in_seconds,
            geometry: RouteGeometry { coordinates },
        })
    }
}
