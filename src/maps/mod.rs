//! Map display.
//!
//! The provider is reached only through the traits in [`capability`]; its
//! availability is published once through a [`CapabilityHandle`]. A
//! [`MapAdapter`] binds one surface to one map and owns its readiness wait.

pub mod adapter;
pub mod capability;
pub mod handle;
pub mod loader;
pub mod session;
pub mod static_maps;
pub mod surface;

pub use adapter::{MapAdapter, MapState, MapView, MountAbort, ReadinessPolicy, DEFAULT_ZOOM};
pub use capability::{
    MapControls, MapInstance, MapOptions, MapSnapshot, MapsCapability, MapsError, Marker,
    MarkerOptions,
};
pub use handle::{capability_channel, CapabilityHandle, CapabilityLoader, CapabilityStatus};
pub use loader::spawn_loader;
pub use session::{MapSession, MapSessions, MapStatusReport};
pub use static_maps::StaticMapsCapability;
pub use surface::{DisplaySurface, ModalSurface};

use serde::Serialize;
use thiserror::Error;

/// Why a map mount ended without a map.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapError {
    #[error("Google Maps API not available after {attempts} attempts: {reason}")]
    CapabilityUnavailable { attempts: u32, reason: String },

    #[error("map container '{surface}' was not attached after {attempts} attempts")]
    SurfaceUnavailable { surface: String, attempts: u32 },

    #[error("failed to initialize map: {reason}")]
    Construction { reason: String },

    #[error("map loading was cancelled")]
    Aborted,
}

impl MapError {
    /// Headline for the error panel.
    pub fn title(&self) -> &'static str {
        match self {
            MapError::CapabilityUnavailable { .. } => "Google Maps API not available",
            MapError::SurfaceUnavailable { .. } => "Map container not ready",
            MapError::Construction { .. } => "Failed to initialize map",
            MapError::Aborted => "Map loading cancelled",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            MapError::CapabilityUnavailable { .. } => {
                "Check that a valid Google Maps API key is configured and that the maps service is reachable, then reopen the map."
            }
            MapError::SurfaceUnavailable { .. } => {
                "The map area was not displayed in time. Close the map and open it again."
            }
            MapError::Construction { .. } => {
                "The map service rejected the request. Check the API key restrictions and the location, then reopen the map."
            }
            MapError::Aborted => "The map was closed before it finished loading.",
        }
    }
}
