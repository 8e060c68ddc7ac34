use async_trait::async_trait;
use std::collections::HashMap;

use super::{GeocodeError, GeocodeResponse, GeocodeStatus, Geocoder};
use crate::directory::seed_profiles;
use crate::domain::Coordinate;

/// Lookup-table geocoder. Addresses are matched case-insensitively after
/// trimming; anything unknown is `ZERO_RESULTS`.
#[derive(Debug, Clone, Default)]
pub struct FixedGeocoder {
    entries: HashMap<String, Coordinate>,
}

impl FixedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Knows the addresses of the seeded sample profiles.
    pub fn with_seed_addresses() -> Self {
        let mut geocoder = Self::new();
        for profile in seed_profiles() {
            if let Some(coordinate) = profile.coordinates {
                geocoder.insert(&profile.address, coordinate);
            }
        }
        geocoder
    }

    pub fn with(mut self, address: &str, coordinate: Coordinate) -> Self {
        self.insert(address, coordinate);
        self
    }

    pub fn insert(&mut self, address: &str, coordinate: Coordinate) {
        self.entries.insert(key(address), coordinate);
    }
}

fn key(address: &str) -> String {
    address.trim().to_lowercase()
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodeResponse, GeocodeError> {
        if address.trim().is_empty() {
            return Ok(GeocodeResponse::status(GeocodeStatus::InvalidRequest));
        }
        Ok(match self.entries.get(&key(address)) {
            Some(coordinate) => GeocodeResponse::found(*coordinate),
            None => GeocodeResponse::status(GeocodeStatus::ZeroResults),
        })
    }
}
