use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::geocoding::google::DEFAULT_ENDPOINT as GEOCODE_ENDPOINT;
use crate::maps::static_maps::{DEFAULT_BASE_URL as STATIC_MAPS_BASE_URL, MAX_ZOOM};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub maps: MapsConfig,
    pub geocoding: GeocodingConfig,
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub log_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: "static".to_string(),
            log_dir: "logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapsConfig {
    pub api_key: String,
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
    pub profile_zoom: u8,
    pub verify_credentials: bool,
    pub static_base_url: String,
    pub width: u32,
    pub height: u32,
    /// Open map modals kept at once; the oldest is closed beyond this.
    pub max_sessions: usize,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            poll_interval_ms: 200,
            max_attempts: 30,
            profile_zoom: 15,
            verify_credentials: false,
            static_base_url: STATIC_MAPS_BASE_URL.to_string(),
            width: 640,
            height: 384,
            max_sessions: 64,
        }
    }
}

impl MapsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GeocodingProvider {
    Google,
    Fixed,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub provider: GeocodingProvider,
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            provider: GeocodingProvider::Google,
            endpoint: GEOCODE_ENDPOINT.to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub seed: bool,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self { seed: true }
    }
}

impl Config {
    /// Loads `config.toml` (or `$PROFILE_EXPLORER_CONFIG`), then applies
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = env::var("PROFILE_EXPLORER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(path)
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let config_content = fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            Self::from_toml(&config_content)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(port) = env::var("PORT").ok().and_then(|s| s.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(key) = env::var("GOOGLE_MAPS_API_KEY") {
            if !key.trim().is_empty() {
                self.maps.api_key = key.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.maps.max_attempts == 0 {
            return Err(AppError::Config("maps.max_attempts must be at least 1".to_string()));
        }
        if self.maps.poll_interval_ms == 0 {
            return Err(AppError::Config("maps.poll_interval_ms must be positive".to_string()));
        }
        if self.maps.width == 0 || self.maps.height == 0 {
            return Err(AppError::Config("maps.width and maps.height must be positive".to_string()));
        }
        if self.maps.profile_zoom > MAX_ZOOM {
            return Err(AppError::Config(format!(
                "maps.profile_zoom must be at most {}, got {}",
                MAX_ZOOM, self.maps.profile_zoom
            )));
        }
        if self.maps.max_sessions == 0 {
            return Err(AppError::Config("maps.max_sessions must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
