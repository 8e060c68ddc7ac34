use serde::Serialize;
use thiserror::Error;

use super::surface::DisplaySurface;
use crate::domain::Coordinate;

pub const MARKER_TITLE: &str = "Profile Location";

/// Errors raised by a mapping provider while building maps or markers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapsError {
    #[error("display surface '{0}' is not attached")]
    SurfaceDetached(String),

    #[error("invalid map options: {0}")]
    InvalidOptions(String),

    #[error("provider error: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapControls {
    pub map_type: bool,
    pub street_view: bool,
    pub fullscreen: bool,
    pub zoom: bool,
}

impl MapControls {
    pub fn all() -> Self {
        Self { map_type: true, street_view: true, fullscreen: true, zoom: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub center: Coordinate,
    pub zoom: u8,
    pub controls: MapControls,
}

impl MapOptions {
    /// Options every adapter-built map uses: all controls enabled.
    pub fn with_controls(center: Coordinate, zoom: u8) -> Self {
        Self { center, zoom, controls: MapControls::all() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerOptions {
    pub position: Coordinate,
    pub title: String,
    pub label: String,
}

impl MarkerOptions {
    /// Marker for the `index`-th entry of a marker list, labelled "1", "2", ...
    pub fn positional(position: Coordinate, index: usize) -> Self {
        Self {
            position,
            title: MARKER_TITLE.to_string(),
            label: (index + 1).to_string(),
        }
    }
}

/// What a map currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSnapshot {
    pub center: Coordinate,
    pub zoom: u8,
    pub controls: MapControls,
    pub markers: Vec<MarkerOptions>,
    pub image_url: Option<String>,
}

/// Entry point of a mapping provider.
pub trait MapsCapability: Send + Sync {
    fn name(&self) -> &str;

    fn create_map(
        &self,
        surface: &dyn DisplaySurface,
        options: &MapOptions,
    ) -> Result<Box<dyn MapInstance>, MapsError>;
}

/// A live map. Markers it hands out stay owned by it.
pub trait MapInstance: Send + Sync {
    fn set_center(&mut self, center: Coordinate);

    fn add_marker(&mut self, options: MarkerOptions) -> Result<Box<dyn Marker>, MapsError>;

    fn snapshot(&self) -> MapSnapshot;
}

pub trait Marker: Send + Sync {
    fn position(&self) -> Coordinate;

    /// Takes the marker off its map. Calling it twice is harmless.
    fn remove(&mut self);
}
