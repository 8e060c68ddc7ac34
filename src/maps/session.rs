use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::adapter::{MapAdapter, MapState, MapView, MountAbort, ReadinessPolicy};
use super::capability::MapSnapshot;
use super::handle::CapabilityHandle;
use super::surface::ModalSurface;
use super::MapError;
use crate::domain::Coordinate;

/// One open map modal.
pub struct MapSession {
    pub id: Uuid,
    pub profile_id: String,
    opened: u64,
    surface: Arc<ModalSurface>,
    adapter: Mutex<MapAdapter>,
    abort: MountAbort,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapStatusReport {
    pub session: Uuid,
    pub profile_id: String,
    pub surface: String,
    pub state: &'static str,
    pub attempts: u32,
    pub error: Option<MapError>,
    pub map: Option<MapSnapshot>,
}

impl MapStatusReport {
    pub fn is_ready(&self) -> bool {
        self.state == "ready"
    }
}

impl MapSession {
    pub async fn mount(&self) -> MapStatusReport {
        let mut adapter = self.adapter.lock().await;
        adapter.mount().await;
        self.report_from(&adapter)
    }

    pub async fn report(&self) -> MapStatusReport {
        let adapter = self.adapter.lock().await;
        self.report_from(&adapter)
    }

    pub async fn set_center(&self, center: Coordinate) -> MapStatusReport {
        let mut adapter = self.adapter.lock().await;
        adapter.set_center(center);
        self.report_from(&adapter)
    }

    pub async fn set_markers(&self, markers: Vec<Coordinate>) -> Result<MapStatusReport, MapError> {
        let mut adapter = self.adapter.lock().await;
        adapter.set_markers(markers)?;
        Ok(self.report_from(&adapter))
    }

    fn report_from(&self, adapter: &MapAdapter) -> MapStatusReport {
        let error = match adapter.state() {
            MapState::Error(e) => Some(e.clone()),
            _ => None,
        };
        MapStatusReport {
            session: self.id,
            profile_id: self.profile_id.clone(),
            surface: adapter.surface_id().to_string(),
            state: adapter.state().label(),
            attempts: adapter.attempts(),
            error,
            map: adapter.snapshot(),
        }
    }

    async fn close(&self) {
        // Abort first: a mount in progress holds the adapter lock.
        self.abort.abort();
        self.surface.detach();
        self.adapter.lock().await.unmount();
    }
}

pub const DEFAULT_MAX_SESSIONS: usize = 64;

/// Registry of open map modals, shared by the web handlers.
///
/// A browser that reloads or navigates away never closes its modal, so the
/// registry keeps at most one session per profile and at most `capacity`
/// sessions overall, closing the oldest first.
#[derive(Clone)]
pub struct MapSessions {
    capability: CapabilityHandle,
    policy: ReadinessPolicy,
    size: (u32, u32),
    capacity: usize,
    opened: Arc<AtomicU64>,
    sessions: Arc<Mutex<HashMap<Uuid, Arc<MapSession>>>>,
}

impl MapSessions {
    pub fn new(capability: CapabilityHandle, policy: ReadinessPolicy, size: (u32, u32)) -> Self {
        Self {
            capability,
            policy,
            size,
            capacity: DEFAULT_MAX_SESSIONS,
            opened: Arc::new(AtomicU64::new(0)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn capability(&self) -> &CapabilityHandle {
        &self.capability
    }

    /// Creates a session whose surface is already on screen. An earlier
    /// session for the same profile is closed, as is the oldest one when the
    /// registry is full.
    pub async fn open(&self, profile_id: &str, view: MapView) -> Arc<MapSession> {
        let id = Uuid::new_v4();
        let surface = Arc::new(ModalSurface::new(format!("map-{}", id), self.size.0, self.size.1));
        surface.attach();

        let adapter = MapAdapter::new(surface.clone(), self.capability.clone(), view, self.policy);
        let session = Arc::new(MapSession {
            id,
            profile_id: profile_id.to_string(),
            opened: self.opened.fetch_add(1, Ordering::Relaxed),
            surface,
            abort: adapter.abort_handle(),
            adapter: Mutex::new(adapter),
        });

        let evicted = {
            let mut sessions = self.sessions.lock().await;
            let mut evicted = take_for_profile(&mut sessions, profile_id);
            while sessions.len() >= self.capacity {
                let oldest = sessions.values().min_by_key(|s| s.opened).map(|s| s.id);
                match oldest.and_then(|old| sessions.remove(&old)) {
                    Some(old) => evicted.push(old),
                    None => break,
                }
            }
            sessions.insert(id, session.clone());
            evicted
        };

        for old in evicted {
            old.close().await;
            tracing::debug!(session = %old.id, profile = %old.profile_id, "map session replaced");
        }
        tracing::debug!(session = %id, profile = profile_id, "map session opened");
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<MapSession>> {
        self.sessions.lock().await.get(&id).cloned()
    }

    /// Returns whether a session was open under that id.
    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id);
        match removed {
            Some(session) => {
                session.close().await;
                tracing::debug!(session = %id, "map session closed");
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn take_for_profile(sessions: &mut HashMap<Uuid, Arc<MapSession>>, profile_id: &str) -> Vec<Arc<MapSession>> {
    let ids: Vec<Uuid> = sessions
        .values()
        .filter(|s| s.profile_id == profile_id)
        .map(|s| s.id)
        .collect();
    ids.iter().filter_map(|id| sessions.remove(id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::handle::capability_channel;
    use crate::maps::static_maps::StaticMapsCapability;
    use std::time::Duration;

    fn ready_sessions() -> MapSessions {
        let capability = Arc::new(StaticMapsCapability::new("key").unwrap());
        MapSessions::new(
            CapabilityHandle::ready(capability),
            ReadinessPolicy { poll_interval: Duration::from_millis(2), max_attempts: 5 },
            (640, 384),
        )
    }

    #[tokio::test]
    async fn test_open_mount_close() {
        let sessions = ready_sessions();
        let center = Coordinate::new(47.6205099, -122.3492774);
        let session = sessions.open("3", MapView::new(center).with_markers(vec![center])).await;

        let report = session.mount().await;
        assert!(report.is_ready());
        assert_eq!(report.map.as_ref().unwrap().markers.len(), 1);
        assert_eq!(sessions.len().await, 1);

        assert!(sessions.close(session.id).await);
        assert!(!sessions.close(session.id).await);
        assert!(sessions.is_empty().await);
        assert!(session.report().await.map.is_none());
    }

    #[tokio::test]
    async fn test_close_aborts_pending_mount() {
        let (_loader, handle) = capability_channel();
        let sessions = MapSessions::new(
            handle,
            ReadinessPolicy { poll_interval: Duration::from_millis(5), max_attempts: 10_000 },
            (640, 384),
        );
        let session = sessions.open("1", MapView::new(Coordinate::new(0.0, 0.0))).await;

        let mounting = tokio::spawn({
            let session = session.clone();
            async move { session.mount().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(sessions.close(session.id).await);

        let report = mounting.await.unwrap();
        assert_eq!(report.error, Some(MapError::Aborted));
    }

    #[tokio::test]
    async fn test_reopening_a_profile_replaces_its_session() {
        let sessions = ready_sessions();
        let center = Coordinate::new(47.6205099, -122.3492774);
        let first = sessions.open("3", MapView::new(center).with_markers(vec![center])).await;
        first.mount().await;

        let second = sessions.open("3", MapView::new(center).with_markers(vec![center])).await;
        assert_eq!(sessions.len().await, 1);
        assert!(sessions.get(first.id).await.is_none());
        assert!(sessions.get(second.id).await.is_some());
        // The replaced session gave up its map.
        assert!(first.report().await.map.is_none());
    }

    #[tokio::test]
    async fn test_oldest_session_closed_at_capacity() {
        let sessions = ready_sessions().with_capacity(2);
        let center = Coordinate::new(0.0, 0.0);
        let a = sessions.open("1", MapView::new(center)).await;
        let b = sessions.open("2", MapView::new(center)).await;
        let c = sessions.open("3", MapView::new(center)).await;

        assert_eq!(sessions.len().await, 2);
        assert!(sessions.get(a.id).await.is_none());
        assert!(sessions.get(b.id).await.is_some());
        assert!(sessions.get(c.id).await.is_some());
    }

    #[tokio::test]
    async fn test_updates_after_mount() {
        let sessions = ready_sessions();
        let a = Coordinate::new(37.4220656, -122.0840897);
        let b = Coordinate::new(37.4845938, -122.1479938);
        let session = sessions.open("1", MapView::new(a).with_markers(vec![a, b])).await;
        session.mount().await;

        let report = session.set_markers(vec![b]).await.unwrap();
        let markers = report.map.unwrap().markers;
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].position, b);

        let report = session.set_center(b).await;
        assert_eq!(report.map.unwrap().center, b);
    }
}
