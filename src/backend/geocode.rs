use crate::backend::traits::Geocoder;
use crate::backend::types::GeocodeOutcome;
use crate::models::GeoLocation;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const GOOGLE_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Connection parameters for the geocoding service
#[derive(Debug, Clone)]
pub struct GeocodeParams {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Geocoder backed by the Google Geocoding JSON API
pub struct GoogleGeocoder {
    client: Client,
    params: GeocodeParams,
}

impl GoogleGeocoder {
    pub fn with_params(params: GeocodeParams) -> Result<Self> {
        let client = Client::builder()
            .timeout(params.timeout)
            .user_agent(concat!("listing-portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, params })
    }
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: GeoLocation,
}

impl GeocodeResponse {
    /// Best match, zero results, or an error for any failure status
    pub fn into_outcome(self) -> Result<GeocodeOutcome> {
        match self.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(GeocodeOutcome::ZeroResults),
            status => anyhow::bail!(
                "Geocoding failed with status {}: {}",
                status,
                self.error_message.as_deref().unwrap_or("no details")
            ),
        }

        let Some(best) = self.results.into_iter().next() else {
            return Ok(GeocodeOutcome::ZeroResults);
        };

        match best.formatted_address {
            Some(formatted_address) => Ok(GeocodeOutcome::Match {
                formatted_address,
                location: best.geometry.location,
            }),
            None => Ok(GeocodeOutcome::ZeroResults),
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn lookup(&self, address: &str) -> Result<GeocodeOutcome> {
        info!("Geocoding address '{}'", address);
        debug!("Fetching URL: {}", self.params.endpoint);

        let response = self
            .client
            .get(&self.params.endpoint)
            .query(&[("address", address), ("key", self.params.api_key.as_str())])
            .send()
            .await
            .context("Failed to reach geocoding service")?;

        if !response.status().is_success() {
            warn!("Geocoding service returned status: {}", response.status());
            anyhow::bail!("Geocoding request failed: {}", response.status());
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .context("Failed to decode geocoding response")?;

        debug!(
            "Geocoding status {} with {} results",
            body.status,
            body.results.len()
        );

        body.into_outcome()
    }

    fn source_name(&self) -> &'static str {
        "Google Geocoding"
    }
}
