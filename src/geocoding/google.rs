use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{GeocodeError, GeocodeResponse, GeocodeStatus, Geocoder};
use crate::config::GeocodingConfig;
use crate::domain::Coordinate;

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: GeocodeStatus,
    #[serde(default)]
    results: Vec<ApiResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    geometry: ApiGeometry,
}

#[derive(Debug, Deserialize)]
struct ApiGeometry {
    location: Coordinate,
}

/// Geocoder backed by the Google Geocoding web service.
pub struct GoogleGeocoder {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &GeocodingConfig, api_key: &str) -> Result<Self, GeocodeError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint.clone(),
            api_key: api_key.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodeResponse, GeocodeError> {
        if address.trim().is_empty() {
            return Ok(GeocodeResponse::status(GeocodeStatus::InvalidRequest));
        }

        // The request URL carries the key; keep it out of error text.
        let response_text = self
            .client
            .get(&self.endpoint)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.without_url()))?
            .text()
            .await
            .map_err(|e| GeocodeError::Transport(e.without_url()))?;

        let parsed = parse_response(&response_text)?;
        if let Some(message) = &parsed.error_message {
            warn!(status = %parsed.status, message, "geocoder reported an error");
        }
        debug!(address, status = %parsed.status, results = parsed.results.len(), "geocoder responded");

        Ok(into_response(parsed))
    }
}

fn parse_response(body: &str) -> Result<ApiResponse, GeocodeError> {
    Ok(serde_json::from_str(body)?)
}

fn into_response(parsed: ApiResponse) -> GeocodeResponse {
    match (parsed.status, parsed.results.first()) {
        (GeocodeStatus::Ok, Some(first)) => GeocodeResponse::found(first.geometry.location),
        // An OK without results is treated like nothing found.
        (GeocodeStatus::Ok, None) => GeocodeResponse::status(GeocodeStatus::ZeroResults),
        (status, _) => GeocodeResponse::status(status),
    }
}
