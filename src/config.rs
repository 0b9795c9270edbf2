use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::{sclog_debug, Error, Result};

/// Default polling interval between health-probe attempts, in seconds.
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 1;
/// Default attempt ceiling when waiting on a dependency.
pub const DEFAULT_DEPENDENCY_ATTEMPTS: u32 = 60;
/// Default attempt ceiling when probing a target service.
pub const DEFAULT_SERVICE_ATTEMPTS: u32 = 60;
/// Default attempt ceiling for `status` probes.
pub const DEFAULT_STATUS_ATTEMPTS: u32 = 5;
/// Default settle delay between stop and start during a restart, in seconds.
pub const DEFAULT_SETTLE_SECS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Compose files in registration order; teardown walks them in reverse.
    #[serde(default = "default_compose_files")]
    pub compose_files: Vec<PathBuf>,
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    #[serde(default = "default_dependency_attempts")]
    pub dependency_attempts: u32,
    #[serde(default = "default_service_attempts")]
    pub service_attempts: u32,
    #[serde(default = "default_status_attempts")]
    pub status_attempts: u32,
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compose_files: default_compose_files(),
            probe_interval_secs: default_probe_interval_secs(),
            dependency_attempts: default_dependency_attempts(),
            service_attempts: default_service_attempts(),
            status_attempts: default_status_attempts(),
            settle_secs: default_settle_secs(),
        }
    }
}

impl Config {
    pub fn stackctl_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".stackctl"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::stackctl_dir()?.join("stackctl.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        sclog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            sclog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(&path)?)?;
        sclog_debug!(
            "Config loaded: compose_files={:?}, interval={}s",
            config.compose_files,
            config.probe_interval_secs
        );
        Ok(config)
    }
}

fn default_compose_files() -> Vec<PathBuf> {
    vec![
        PathBuf::from("docker-compose.yml"),
        PathBuf::from("infrastructure/docker-compose.yml"),
    ]
}

fn default_probe_interval_secs() -> u64 {
    DEFAULT_PROBE_INTERVAL_SECS
}

fn default_dependency_attempts() -> u32 {
    DEFAULT_DEPENDENCY_ATTEMPTS
}

fn default_service_attempts() -> u32 {
    DEFAULT_SERVICE_ATTEMPTS
}

fn default_status_attempts() -> u32 {
    DEFAULT_STATUS_ATTEMPTS
}

fn default_settle_secs() -> u64 {
    DEFAULT_SETTLE_SECS
}
