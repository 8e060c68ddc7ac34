use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, info_span, trace, warn, Instrument};

use super::capability::{MapInstance, MapOptions, MapSnapshot, MapsCapability, Marker, MarkerOptions};
use super::handle::{CapabilityHandle, CapabilityStatus};
use super::surface::DisplaySurface;
use super::MapError;
use crate::config::MapsConfig;
use crate::domain::Coordinate;
use crate::observability::metrics;

pub const DEFAULT_ZOOM: u8 = 10;

/// Declarative input of a map: where to look and what to pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub markers: Vec<Coordinate>,
    pub zoom: u8,
}

impl MapView {
    pub fn new(center: Coordinate) -> Self {
        Self { center, markers: Vec::new(), zoom: DEFAULT_ZOOM }
    }

    pub fn with_markers(mut self, markers: Vec<Coordinate>) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }
}

/// How long a mount waits for the provider and the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(200), max_attempts: 30 }
    }
}

impl From<&MapsConfig> for ReadinessPolicy {
    fn from(config: &MapsConfig) -> Self {
        Self { poll_interval: config.poll_interval(), max_attempts: config.max_attempts }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapState {
    Loading,
    Ready,
    Error(MapError),
}

impl MapState {
    pub fn label(&self) -> &'static str {
        match self {
            MapState::Loading => "loading",
            MapState::Ready => "ready",
            MapState::Error(_) => "error",
        }
    }
}

/// Cancels a pending mount from outside the adapter.
#[derive(Clone)]
pub struct MountAbort {
    tx: Arc<watch::Sender<bool>>,
}

impl MountAbort {
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Drives one map on one surface.
///
/// `mount` waits (bounded) until both the provider and the surface are
/// available, then builds the map exactly once. Afterwards `set_center` and
/// `set_markers` keep it in sync with the latest inputs. `Ready` and `Error`
/// are final for the adapter; a retry needs a new one.
pub struct MapAdapter {
    surface: Arc<dyn DisplaySurface>,
    capability: CapabilityHandle,
    policy: ReadinessPolicy,
    view: MapView,
    state: MapState,
    map: Option<Box<dyn MapInstance>>,
    markers: Vec<Box<dyn Marker>>,
    abort: Arc<watch::Sender<bool>>,
    attempts: u32,
}

impl MapAdapter {
    pub fn new(
        surface: Arc<dyn DisplaySurface>,
        capability: CapabilityHandle,
        view: MapView,
        policy: ReadinessPolicy,
    ) -> Self {
        let (abort, _) = watch::channel(false);
        Self {
            surface,
            capability,
            policy,
            view,
            state: MapState::Loading,
            map: None,
            markers: Vec::new(),
            abort: Arc::new(abort),
            attempts: 0,
        }
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Readiness checks made by the last mount.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn surface_id(&self) -> &str {
        self.surface.id()
    }

    pub fn abort_handle(&self) -> MountAbort {
        MountAbort { tx: Arc::clone(&self.abort) }
    }

    pub fn snapshot(&self) -> Option<MapSnapshot> {
        self.map.as_ref().map(|map| map.snapshot())
    }

    pub async fn mount(&mut self) -> &MapState {
        if !matches!(self.state, MapState::Loading) {
            return &self.state;
        }

        let span = info_span!("map_mount", surface = %self.surface.id());
        let outcome = self.wait_until_ready().instrument(span.clone()).await;

        let _enter = span.enter();
        self.state = match outcome.and_then(|capability| self.construct(capability.as_ref())) {
            Ok(()) => {
                info!(attempts = self.attempts, markers = self.markers.len(), "map ready");
                MapState::Ready
            }
            Err(e) => {
                warn!(attempts = self.attempts, error = %e, "map failed to load");
                MapState::Error(e)
            }
        };
        metrics::maps::mount(self.state.label(), self.attempts);
        &self.state
    }

    async fn wait_until_ready(&mut self) -> Result<Arc<dyn MapsCapability>, MapError> {
        let mut abort = self.abort.subscribe();
        if *abort.borrow_and_update() {
            return Err(MapError::Aborted);
        }

        let mut ticker = tokio::time::interval(self.policy.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.attempts = 0;
        let mut capability_ready = false;
        while self.attempts < self.policy.max_attempts {
            tokio::select! {
                biased;
                _ = abort.changed() => {
                    debug!(attempts = self.attempts, "mount aborted");
                    return Err(MapError::Aborted);
                }
                _ = ticker.tick() => {}
            }

            self.attempts += 1;
            let attached = self.surface.is_attached();
            match self.capability.status() {
                CapabilityStatus::Failed(reason) => {
                    return Err(MapError::CapabilityUnavailable { attempts: self.attempts, reason });
                }
                CapabilityStatus::Ready(capability) if attached => return Ok(capability),
                CapabilityStatus::Ready(_) => capability_ready = true,
                CapabilityStatus::Loading => capability_ready = false,
            }
            trace!(attempt = self.attempts, capability_ready, attached, "map not ready yet");
        }

        if capability_ready {
            Err(MapError::SurfaceUnavailable {
                surface: self.surface.id().to_string(),
                attempts: self.attempts,
            })
        } else {
            Err(MapError::CapabilityUnavailable {
                attempts: self.attempts,
                reason: "the maps script never finished loading".to_string(),
            })
        }
    }

    fn construct(&mut self, capability: &dyn MapsCapability) -> Result<(), MapError> {
        if self.map.is_some() {
            return Ok(());
        }

        let options = MapOptions::with_controls(self.view.center, self.view.zoom);
        let map = capability
            .create_map(self.surface.as_ref(), &options)
            .map_err(|e| MapError::Construction { reason: e.to_string() })?;
        self.map = Some(map);

        if let Err(e) = self.replace_markers() {
            self.teardown();
            return Err(e);
        }
        Ok(())
    }

    /// Recenters a ready map in place; otherwise the center is used when the
    /// map gets built.
    pub fn set_center(&mut self, center: Coordinate) {
        self.view.center = center;
        if let (MapState::Ready, Some(map)) = (&self.state, self.map.as_mut()) {
            map.set_center(center);
        }
    }

    /// Swaps the whole marker set. A provider failure here is a construction
    /// failure: the map is torn down and the adapter moves to `Error`.
    pub fn set_markers(&mut self, markers: Vec<Coordinate>) -> Result<(), MapError> {
        self.view.markers = markers;
        if !matches!(self.state, MapState::Ready) {
            return Ok(());
        }
        if let Err(e) = self.replace_markers() {
            warn!(surface = %self.surface.id(), error = %e, "marker update failed");
            self.teardown();
            self.state = MapState::Error(e.clone());
            return Err(e);
        }
        Ok(())
    }

    fn replace_markers(&mut self) -> Result<(), MapError> {
        let Some(map) = self.map.as_mut() else {
            return Ok(());
        };

        for mut marker in self.markers.drain(..) {
            marker.remove();
        }
        for (index, position) in self.view.markers.iter().enumerate() {
            let marker = map
                .add_marker(MarkerOptions::positional(*position, index))
                .map_err(|e| MapError::Construction { reason: e.to_string() })?;
            self.markers.push(marker);
        }
        Ok(())
    }

    fn teardown(&mut self) {
        for mut marker in self.markers.drain(..) {
            marker.remove();
        }
        self.map = None;
    }

    /// Cancels a pending mount and releases the map and its markers.
    pub fn unmount(&mut self) {
        self.abort.send_replace(true);
        self.teardown();
        debug!(surface = %self.surface.id(), "map unmounted");
    }
}

impl Drop for MapAdapter {
    fn drop(&mut self) {
        self.abort.send_replace(true);
        self.teardown();
    }
}
