//! Address → coordinate lookup.
//!
//! The [`Geocoder`] port is implemented by [`GoogleGeocoder`] (Geocoding
//! HTTP API) and [`FixedGeocoder`] (lookup table, used offline and in tests).
//! Callers that only care about "a coordinate or nothing" go through
//! [`resolve`], which never fails.

mod fixed;
pub mod google;

pub use fixed::FixedGeocoder;
pub use google::GoogleGeocoder;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, GeocodingProvider};
use crate::domain::Coordinate;
use crate::observability::metrics;

/// Status codes reported by the geocoding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeocodeStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    #[serde(other)]
    UnknownError,
}

impl GeocodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocodeStatus::Ok => "OK",
            GeocodeStatus::ZeroResults => "ZERO_RESULTS",
            GeocodeStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            GeocodeStatus::RequestDenied => "REQUEST_DENIED",
            GeocodeStatus::InvalidRequest => "INVALID_REQUEST",
            GeocodeStatus::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for GeocodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResponse {
    pub status: GeocodeStatus,
    pub coordinate: Option<Coordinate>,
}

impl GeocodeResponse {
    pub fn found(coordinate: Coordinate) -> Self {
        Self { status: GeocodeStatus::Ok, coordinate: Some(coordinate) }
    }

    pub fn status(status: GeocodeStatus) -> Self {
        Self { status, coordinate: None }
    }

    /// Only an `OK` status with a location counts as a hit.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self.status {
            GeocodeStatus::Ok => self.coordinate,
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geocoding response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeocodeResponse, GeocodeError>;
}

/// Picks the geocoder the configuration asks for. Google needs the maps API
/// key; without one the seeded lookup table is used instead.
pub fn from_config(config: &Config) -> Result<Arc<dyn Geocoder>, GeocodeError> {
    match config.geocoding.provider {
        GeocodingProvider::Google if !config.maps.api_key.is_empty() => {
            let geocoder = GoogleGeocoder::from_config(&config.geocoding, &config.maps.api_key)?;
            Ok(Arc::new(geocoder))
        }
        GeocodingProvider::Google => {
            warn!("no Google Maps API key, geocoding only knows the seeded addresses");
            Ok(Arc::new(FixedGeocoder::with_seed_addresses()))
        }
        GeocodingProvider::Fixed => Ok(Arc::new(FixedGeocoder::with_seed_addresses())),
    }
}

/// Best-effort lookup: transport errors and non-`OK` statuses both come back
/// as `None`.
pub async fn resolve(geocoder: &dyn Geocoder, address: &str) -> Option<Coordinate> {
    match geocoder.geocode(address).await {
        Ok(response) => {
            metrics::geocode::request(response.status.as_str());
            match response.coordinate() {
                Some(coordinate) => {
                    debug!(address, %coordinate, "address geocoded");
                    Some(coordinate)
                }
                None => {
                    debug!(address, status = %response.status, "address not resolved");
                    None
                }
            }
        }
        Err(e) => {
            metrics::geocode::request(GeocodeStatus::UnknownError.as_str());
            warn!(address, error = %e, "geocoding failed");
            None
        }
    }
}
