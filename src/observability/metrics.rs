//! Metrics for the profile directory.
//!
//! Names come from [`MetricName`] so no call site spells a metric by hand.
//! A Prometheus recorder is installed by [`init`]; [`render`] produces the
//! text exposition served at `/metrics`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    ProfilesCreated,
    ProfilesUpdated,
    ProfilesDeleted,
    GeocodeRequests,
    MapMounts,
    MapMountAttempts,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ProfilesCreated => "pe_profiles_created_total",
            MetricName::ProfilesUpdated => "pe_profiles_updated_total",
            MetricName::ProfilesDeleted => "pe_profiles_deleted_total",
            MetricName::GeocodeRequests => "pe_geocode_requests_total",
            MetricName::MapMounts => "pe_map_mounts_total",
            MetricName::MapMountAttempts => "pe_map_mount_attempts",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            ProfilesCreated,
            ProfilesUpdated,
            ProfilesDeleted,
            GeocodeRequests,
            MapMounts,
            MapMountAttempts,
        ]
        .into_iter()
    }

    pub fn description(&self) -> &'static str {
        match self {
            MetricName::ProfilesCreated => "Profiles added to the directory",
            MetricName::ProfilesUpdated => "Profiles edited",
            MetricName::ProfilesDeleted => "Profiles removed",
            MetricName::GeocodeRequests => "Geocoding lookups by provider status",
            MetricName::MapMounts => "Map mounts by outcome",
            MetricName::MapMountAttempts => "Readiness checks needed per map mount",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static PROMETHEUS: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the Prometheus recorder. Calling it again is a no-op.
pub fn init() -> Result<(), String> {
    if PROMETHEUS.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;

    for metric in MetricName::all_metrics() {
        match metric {
            MetricName::MapMountAttempts => {
                ::metrics::describe_histogram!(metric.as_str(), metric.description())
            }
            _ => ::metrics::describe_counter!(metric.as_str(), metric.description()),
        }
    }

    PROMETHEUS.set(handle).ok();
    info!("Metrics system initialized");
    Ok(())
}

/// Prometheus text exposition, empty until [`init`] ran.
pub fn render() -> String {
    PROMETHEUS.get().map(|handle| handle.render()).unwrap_or_default()
}

pub mod directory {
    use super::MetricName;

    pub fn profile_created() {
        ::metrics::counter!(MetricName::ProfilesCreated.as_str()).increment(1);
    }

    pub fn profile_updated() {
        ::metrics::counter!(MetricName::ProfilesUpdated.as_str()).increment(1);
    }

    pub fn profile_deleted() {
        ::metrics::counter!(MetricName::ProfilesDeleted.as_str()).increment(1);
    }
}

pub mod geocode {
    use super::MetricName;

    pub fn request(status: &'static str) {
        ::metrics::counter!(MetricName::GeocodeRequests.as_str(), "status" => status).increment(1);
    }
}

pub mod maps {
    use super::MetricName;

    pub fn mount(outcome: &'static str, attempts: u32) {
        ::metrics::counter!(MetricName::MapMounts.as_str(), "outcome" => outcome).increment(1);
        ::metrics::histogram!(MetricName::MapMountAttempts.as_str()).record(attempts as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_unique() {
        let names: std::collections::HashSet<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), MetricName::all_metrics().count());
        assert!(names.iter().all(|n| n.starts_with("pe_")));
    }

    #[test]
    fn test_recording_without_recorder_is_harmless() {
        directory::profile_created();
        geocode::request("OK");
        maps::mount("ready", 1);
    }
}
