//! Settings file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::{self, config_path};
use super::{Error, Result};

/// Main settings structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Settings {
    /// Remote service endpoint settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Status polling settings
    #[serde(default)]
    pub poll: PollConfig,

    /// Runtime state storage
    #[serde(default)]
    pub state: StateConfig,
}

/// Where and how the remote service is reached
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Host serving the per-domain XML-RPC endpoints
    #[serde(default = "default_host")]
    pub host: String,

    /// URL scheme, "https" unless pointed at a local test server
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Timeout for a single remote call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            scheme: default_scheme(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "app.netrounds.com".to_string()
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

/// Status polling settings
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    /// Seconds to sleep between two status checks
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,

    /// Give up after this many status checks (unbounded when unset)
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
            max_attempts: None,
        }
    }
}

fn default_poll_interval() -> u64 {
    30
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Runtime state storage settings
#[derive(Debug, Deserialize, Default, Clone)]
pub struct StateConfig {
    /// Directory for per-instance state files (platform data dir when unset)
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl StateConfig {
    /// Resolve the state directory
    pub fn resolve_dir(&self) -> Result<PathBuf> {
        self.dir
            .clone()
            .or_else(paths::state_dir)
            .ok_or_else(|| Error::Config("Cannot determine runtime state directory".to_string()))
    }
}

impl Settings {
    /// Load settings from the default settings file
    ///
    /// Returns default settings if the file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse settings from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}
