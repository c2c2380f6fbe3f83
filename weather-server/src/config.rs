// weather-server/src/config.rs
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use url::Url;

pub const CONFIG_FILE_PATH: &str = "data/server/config.json";

pub const NWS_API_BASE_URL: &str = "https://api.weather.gov";
pub const USER_AGENT: &str = "weather-app/1.0";
pub const GEO_JSON_ACCEPT: &str = "application/geo+json";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const SESSION_TTL_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error: config: failed to read {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("Error: config: invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Error: config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Http,
    Stdio,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub transport: TransportKind,
    /// Idle seconds before an HTTP session is evicted
    pub session_ttl_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection {
            name: "weather".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3001,
            transport: TransportKind::Http,
            session_ttl_secs: SESSION_TTL_SECS,
        }
    }
}

impl ServerSection {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// Outbound settings for the National Weather Service API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NwsConfig {
    pub base_url: String,
    pub user_agent: String,
    pub accept: String,
    pub timeout_secs: u64,
}

impl Default for NwsConfig {
    fn default() -> Self {
        NwsConfig {
            base_url: NWS_API_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            accept: GEO_JSON_ACCEPT.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl NwsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub nws: NwsConfig,
}

impl ServerConfig {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(ServerConfig::default());
        }

        info!("Loading config from: {}", path.display());
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.nws.base_url).map_err(|e| {
            ConfigError::Invalid(format!("invalid nws.base_url '{}': {}", self.nws.base_url, e))
        })?;
        if self.nws.timeout_secs == 0 {
            return Err(ConfigError::Invalid("nws.timeout_secs must be greater than 0".into()));
        }
        if self.server.session_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.session_ttl_secs must be greater than 0".into(),
            ));
        }
        if self.server.name.trim().is_empty() {
            return Err(ConfigError::Invalid("server.name must not be empty".into()));
        }
        Ok(())
    }
}
