use std::sync::Arc;
use tracing::{info, warn};

use super::handle::{capability_channel, CapabilityHandle, CapabilityLoader};
use super::static_maps::StaticMapsCapability;
use crate::config::MapsConfig;

/// Starts loading the maps provider in the background and returns the handle
/// adapters wait on.
pub fn spawn_loader(config: &MapsConfig) -> CapabilityHandle {
    let (loader, handle) = capability_channel();
    let config = config.clone();
    tokio::spawn(async move {
        load(&config, &loader).await;
    });
    handle
}

async fn load(config: &MapsConfig, loader: &CapabilityLoader) {
    if config.api_key.trim().is_empty() {
        warn!("no Google Maps API key configured, maps are disabled");
        loader.fail("missing Google Maps API key");
        return;
    }

    let capability = match StaticMapsCapability::from_config(config) {
        Ok(capability) => capability,
        Err(e) => {
            warn!(error = %e, "maps provider misconfigured");
            loader.fail(e.to_string());
            return;
        }
    };

    if config.verify_credentials {
        if let Err(reason) = probe(&capability).await {
            warn!(reason = %reason, "maps credential check failed");
            loader.fail(reason);
            return;
        }
    }

    info!("maps provider ready");
    loader.ready(Arc::new(capability));
}

async fn probe(capability: &StaticMapsCapability) -> Result<(), String> {
    let response = reqwest::get(capability.probe_url())
        .await
        .map_err(|e| format!("maps service unreachable: {}", e.without_url()))?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("maps service answered {}", status))
    }
}
