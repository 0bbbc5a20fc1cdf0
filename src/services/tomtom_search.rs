//! TomTom Search API client (fuzzy search)
//!
//! API documentation:
//! https://developer.tomtom.com/search-api/documentation/search-service/fuzzy-search

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::types::Coordinates;

#[derive(Debug, Deserialize)]
pub struct FuzzySearchResponse {
    #[serde(default)]
    pub results: Vec<FuzzySearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct FuzzySearchResult {
    pub position: SearchPosition,
    #[serde(default)]
    pub address: Option<SearchAddress>,
}

#[derive(Debug, Deserialize)]
pub struct SearchPosition {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAddress {
    pub freeform_address: Option<String>,
}

/// A resolved search candidate
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCandidate {
    pub coordinates: Coordinates,
    pub address: String,
}

impl FuzzySearchResponse {
    pub fn into_candidates(self, query: &str) -> Vec<SearchCandidate> {
        self.results
            .into_iter()
            .map(|r| SearchCandidate {
                coordinates: Coordinates { lat: r.position.lat, lng: r.position.lon },
                address: r
                    .address
                    .and_then(|a| a.freeform_address)
                    .unwrap_or_else(|| query.to_string()),
            })
            .collect()
    }
}

/// TomTom fuzzy search client
pub struct TomTomSearchClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl TomTomSearchClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("Optiroute/1.0")
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    pub fn search_url(&self, query: &str, limit: usize) -> String {
        format!(
            "{}/search/2/search/{}.json?key={}&limit={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key),
            limit
        )
    }

    /// Free-text search, best candidates first
    pub async fn fuzzy_search(&self, query: &str, limit: usize) -> Result<Vec<SearchCandidate>> {
        let url = self.search_url(query, limit);
        debug!("Fuzzy search for '{}' (limit {})", query, limit);

        let response = self.client
            .get(&url)
            .send()
            .await
            .context("Failed to send fuzzy search request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("TomTom search returned error {}: {}", status, body);
        }

        let parsed: FuzzySearchResponse = response
            .json()
            .await
            .context("Failed to parse fuzzy search response")?;

        Ok(parsed.into_candidates(query))
    }
}
