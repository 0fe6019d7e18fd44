use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::collect::global_variables::ELEVATION_LOOKUP_PATH;
use crate::config::RoadConfig;
use crate::geometric::elevation::ElevationLookup;

/// Open-Elevation client
///
/// One blocking `POST /api/v1/lookup` per batch. Caching and rate limiting are
/// left to whatever sits in front of the service.
pub struct OpenElevation {
    client: Client,
    lookup_url: Url,
}

/// Lookup request body: `{"locations": [{"latitude": .., "longitude": ..}]}`
#[derive(Debug, Serialize)]
struct LookupRequest {
    locations: Vec<Location>,
}

#[derive(Debug, Serialize)]
struct Location {
    latitude: f64,
    longitude: f64,
}

/// Lookup response body: `{"results": [{"elevation": ..}]}`
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    elevation: Option<f64>,
}

impl OpenElevation {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&RoadConfig {
            elevation_url: base_url.to_string(),
            ..Default::default()
        })
    }

    pub fn from_config(config: &RoadConfig) -> Result<Self> {
        let lookup_url = Self::build_lookup_url(&config.elevation_url)?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(OpenElevation { client, lookup_url })
    }

    fn build_lookup_url(base_url: &str) -> Result<Url> {
        Url::parse(base_url)
            .with_context(|| format!("Invalid elevation service URL: {}", base_url))?
            .join(ELEVATION_LOOKUP_PATH)
            .context("Failed to build elevation lookup URL")
    }

    pub fn lookup_url(&self) -> &Url {
        &self.lookup_url
    }
}

impl ElevationLookup for OpenElevation {
    fn lookup(&self, locations: &[(f64, f64)]) -> Result<Vec<Option<f64>>> {
        let body = LookupRequest {
            locations: locations
                .iter()
                .map(|&(latitude, longitude)| Location {
                    latitude,
                    longitude,
                })
                .collect(),
        };

        let response = self
            .client
            .post(self.lookup_url.clone())
            .json(&body)
            .send()
            .context("Failed to send elevation lookup request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            anyhow::bail!("Open-Elevation returned error {}: {}", status, text);
        }

        let parsed: LookupResponse = response
            .json()
            .context("Failed to parse Open-Elevation response")?;

        Ok(parsed.results.into_iter().map(|r| r.elevation).collect())
    }
}
