//! Client configuration loaded from the environment.

use crate::storage::{DEFAULT_AUTOSAVE_INTERVAL_SECS, FileStorage, StorageError};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default persistence API location.
pub const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Default request timeout in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 5;

const ENV_API_URL: &str = "INKBOARD_API_URL";
const ENV_API_TIMEOUT: &str = "INKBOARD_API_TIMEOUT_SECS";
const ENV_DATA_DIR: &str = "INKBOARD_DATA_DIR";
const ENV_AUTOSAVE: &str = "INKBOARD_AUTOSAVE_SECS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },
    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Settings for the whiteboard client.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// Base URL of the persistence API, without the `/api` prefix.
    pub api_url: String,
    pub api_timeout: Duration,
    /// Snapshot directory. `None` uses the platform default.
    pub data_dir: Option<PathBuf>,
    pub autosave_interval: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            data_dir: None,
            autosave_interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
        }
    }
}

impl BoardConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names. Unset or blank values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            let url = url.trim().trim_end_matches('/').to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    var: ENV_API_URL,
                    value: url,
                });
            }
            config.api_url = url;
        }
        if let Some(value) = get(ENV_API_TIMEOUT) {
            config.api_timeout = parse_seconds(ENV_API_TIMEOUT, value)?;
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = get(ENV_AUTOSAVE) {
            config.autosave_interval = parse_seconds(ENV_AUTOSAVE, value)?;
        }
        Ok(config)
    }

    /// Snapshot directory, falling back to the platform data dir.
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(FileStorage::default_dir()?),
        }
    }
}

fn parse_seconds(var: &'static str, value: String) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidSeconds { var, value })
}
