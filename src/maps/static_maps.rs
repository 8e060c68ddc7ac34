//! Google Static Maps provider.
//!
//! A "map" here is the parameter set of a Static Maps image request; the
//! rendered page shows the resulting image. Markers share the map's state,
//! so removing one drops it from the next rendered URL.

use reqwest::Url;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::capability::{
    MapControls, MapInstance, MapOptions, MapSnapshot, MapsCapability, MapsError, Marker,
    MarkerOptions,
};
use super::surface::DisplaySurface;
use crate::config::MapsConfig;
use crate::domain::Coordinate;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";
pub const MAX_ZOOM: u8 = 21;

pub struct StaticMapsCapability {
    base_url: Url,
    api_key: String,
}

impl StaticMapsCapability {
    pub fn new(api_key: impl Into<String>) -> Result<Self, MapsError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: impl Into<String>) -> Result<Self, MapsError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| MapsError::Provider(format!("invalid static maps url '{}': {}", base_url, e)))?;
        Ok(Self { base_url, api_key: api_key.into() })
    }

    pub fn from_config(config: &MapsConfig) -> Result<Self, MapsError> {
        Self::with_base_url(&config.static_base_url, config.api_key.clone())
    }

    /// A tiny image request used to check that the key is accepted.
    pub fn probe_url(&self) -> String {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("center", "0,0")
            .append_pair("zoom", "1")
            .append_pair("size", "1x1")
            .append_pair("key", &self.api_key);
        url.to_string()
    }
}

impl MapsCapability for StaticMapsCapability {
    fn name(&self) -> &str {
        "google-static-maps"
    }

    fn create_map(
        &self,
        surface: &dyn DisplaySurface,
        options: &MapOptions,
    ) -> Result<Box<dyn MapInstance>, MapsError> {
        if !surface.is_attached() {
            return Err(MapsError::SurfaceDetached(surface.id().to_string()));
        }
        check_position(options.center)?;
        if options.zoom > MAX_ZOOM {
            return Err(MapsError::InvalidOptions(format!(
                "zoom {} is above the maximum of {}",
                options.zoom, MAX_ZOOM
            )));
        }

        let state = StaticMapState {
            center: options.center,
            zoom: options.zoom,
            size: surface.size(),
            controls: options.controls,
            markers: BTreeMap::new(),
            next_marker: 0,
        };

        Ok(Box::new(StaticMap {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            state: Arc::new(Mutex::new(state)),
        }))
    }
}

fn check_position(position: Coordinate) -> Result<(), MapsError> {
    let valid = position.lat.is_finite()
        && position.lng.is_finite()
        && (-90.0..=90.0).contains(&position.lat)
        && (-180.0..=180.0).contains(&position.lng);
    if valid {
        Ok(())
    } else {
        Err(MapsError::InvalidOptions(format!("coordinate {} is out of range", position)))
    }
}

struct StaticMapState {
    center: Coordinate,
    zoom: u8,
    size: (u32, u32),
    controls: MapControls,
    markers: BTreeMap<u64, MarkerOptions>,
    next_marker: u64,
}

fn lock(state: &Mutex<StaticMapState>) -> MutexGuard<'_, StaticMapState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct StaticMap {
    base_url: Url,
    api_key: String,
    state: Arc<Mutex<StaticMapState>>,
}

impl StaticMap {
    fn image_url(&self, state: &StaticMapState) -> String {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("center", &state.center.to_string())
                .append_pair("zoom", &state.zoom.to_string())
                .append_pair("size", &format!("{}x{}", state.size.0, state.size.1))
                .append_pair("maptype", "roadmap");
            for marker in state.markers.values() {
                query.append_pair("markers", &marker_param(marker));
            }
            query.append_pair("key", &self.api_key);
        }
        url.to_string()
    }
}

/// Static Maps labels are a single uppercase letter or digit; longer
/// positional labels are drawn without one.
fn marker_param(marker: &MarkerOptions) -> String {
    let mut chars = marker.label.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => {
            format!("label:{}|{}", c.to_ascii_uppercase(), marker.position)
        }
        _ => marker.position.to_string(),
    }
}

impl MapInstance for StaticMap {
    fn set_center(&mut self, center: Coordinate) {
        lock(&self.state).center = center;
    }

    fn add_marker(&mut self, options: MarkerOptions) -> Result<Box<dyn Marker>, MapsError> {
        check_position(options.position)?;
        let position = options.position;
        let id = {
            let mut state = lock(&self.state);
            let id = state.next_marker;
            state.next_marker += 1;
            state.markers.insert(id, options);
            id
        };
        Ok(Box::new(StaticMarker {
            id,
            position,
            map: Arc::downgrade(&self.state),
        }))
    }

    fn snapshot(&self) -> MapSnapshot {
        let state = lock(&self.state);
        MapSnapshot {
            center: state.center,
            zoom: state.zoom,
            controls: state.controls,
            markers: state.markers.values().cloned().collect(),
            image_url: Some(self.image_url(&state)),
        }
    }
}

struct StaticMarker {
    id: u64,
    position: Coordinate,
    map: Weak<Mutex<StaticMapState>>,
}

impl Marker for StaticMarker {
    fn position(&self) -> Coordinate {
        self.position
    }

    fn remove(&mut self) {
        if let Some(state) = self.map.upgrade() {
            lock(&state).markers.remove(&self.id);
        }
    }
}
