use std::sync::Arc;

use crate::config::Config;
use crate::directory::DirectoryService;
use crate::error::Result;
use crate::maps::{CapabilityHandle, MapSessions, MapStatusReport, ReadinessPolicy};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<DirectoryService>,
    pub maps: MapSessions,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, directory: DirectoryService, capability: CapabilityHandle) -> Self {
        let maps = MapSessions::new(
            capability,
            ReadinessPolicy::from(&config.maps),
            (config.maps.width, config.maps.height),
        )
        .with_capacity(config.maps.max_sessions);
        Self {
            directory: Arc::new(directory),
            maps,
            config: Arc::new(config),
        }
    }

    /// Opens a map session for the profile and mounts it.
    ///
    /// `None` when the profile has no coordinates. A mount that ends in an
    /// error closes its session right away; the report still describes it.
    pub async fn open_map(&self, profile_id: &str) -> Result<Option<MapStatusReport>> {
        let Some(view) = self.directory.map_request(profile_id).await? else {
            return Ok(None);
        };

        let session = self.maps.open(profile_id, view).await;
        let report = session.mount().await;
        if !report.is_ready() {
            self.maps.close(session.id).await;
        }
        Ok(Some(report))
    }
}
