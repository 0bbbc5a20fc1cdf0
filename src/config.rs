//! Configuration management

use std::time::Duration;

use anyhow::{self, Context, Result};

const DEFAULT_TOMTOM_BASE_URL: &str = "https://api.tomtom.com";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// TomTom API key (search + routing). Mock backends are used when unset.
    pub tomtom_api_key: Option<String>,

    /// TomTom API base URL
    pub tomtom_base_url: String,

    /// Emissions estimation endpoint (optional, local factors otherwise)
    pub emissions_api_url: Option<String>,

    /// Bearer key for the emissions endpoint
    pub emissions_api_key: Option<String>,

    /// Timeout for outbound HTTP requests
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let tomtom_api_key = non_empty_var("TOMTOM_API_KEY");

        let tomtom_base_url = std::env::var("TOMTOM_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_TOMTOM_BASE_URL.to_string());

        let emissions_api_url = non_empty_var("EMISSIONS_API_URL");
        let emissions_api_key = non_empty_var("EMISSIONS_API_KEY");

        let http_timeout_secs = match std::env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("HTTP_TIMEOUT_SECS must be a number of seconds, got '{}'", raw))?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        if http_timeout_secs == 0 {
            anyhow::bail!("HTTP_TIMEOUT_SECS must be greater than zero");
        }

        if emissions_api_url.is_some() && emissions_api_key.is_none() {
            tracing::warn!("EMISSIONS_API_URL is set without EMISSIONS_API_KEY, requests will be unauthenticated");
        }

        Ok(Self {
            nats_url,
            tomtom_api_key,
            tomtom_base_url,
            emissions_api_url,
            emissions_api_key,
            http_timeout_secs,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Offline configuration: mock backends, local emission factors
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            nats_url: "nats://localhost:4222".to_string(),
            tomtom_api_key: None,
            tomtom_base_url: DEFAULT_TOMTOM_BASE_URL.to_string(),
            emissions_api_url: None,
            emissions_api_key: None,
            http_timeout_secs: 5,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_tomtom_key_none_when_not_set() {
        std::env::remove_var("TOMTOM_API_KEY");

        let config = Config::from_env().unwrap();
        assert!(config.tomtom_api_key.is_none());
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_tomtom_base_url_defaults_to_public() {
        std::env::remove_var("TOMTOM_BASE_URL");

        let config = Config::from_env().unwrap();
        assert_eq!(config.tomtom_base_url, "https://api.tomtom.com");
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_rejects_zero_timeout() {
        std::env::set_var("HTTP_TIMEOUT_SECS", "0");

        let result = Config::from_env();
        std::env::remove_var("HTTP_TIMEOUT_SECS");

        assert!(result.is_err());
    }

    #[test]
    fn test_non_empty_var_filters_blank_values() {
        std::env::set_var("OPTIROUTE_TEST_BLANK_VAR", "   ");
        assert!(non_empty_var("OPTIROUTE_TEST_BLANK_VAR").is_none());

        std::env::set_var("OPTIROUTE_TEST_BLANK_VAR", "value");
        assert_eq!(non_empty_var("OPTIROUTE_TEST_BLANK_VAR"), Some("value".to_string()));

        std::env::remove_var("OPTIROUTE_TEST_BLANK_VAR");
    }

    #[test]
    fn test_http_timeout_duration() {
        let config = Config::for_tests();
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
    }
}
