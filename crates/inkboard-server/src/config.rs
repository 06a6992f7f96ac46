//! Server settings from the environment.

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 4000;

/// Origins always accepted by CORS (local dev server and preview build).
pub const LOCAL_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:4173"];

/// Hosted frontends on this domain are accepted without configuration.
pub const HOSTED_ORIGIN_MARKER: &str = "netlify.app";

/// Largest accepted JSON request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535, got {0:?}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Production frontend origin (`FRONTEND_URL`).
    pub frontend_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            frontend_url: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();
        if let Some(port) = get("PORT") {
            config.port = match port.parse::<u16>() {
                Ok(p) if p > 0 => p,
                _ => return Err(ConfigError::InvalidPort(port)),
            };
        }
        config.frontend_url = get("FRONTEND_URL").map(|u| u.trim_end_matches('/').to_string());
        Ok(config)
    }

    /// Whether a browser origin may call the API.
    pub fn origin_allowed(&self, origin: &str) -> bool {
        LOCAL_ORIGINS.contains(&origin)
            || self.frontend_url.as_deref() == Some(origin)
            || origin.contains(HOSTED_ORIGIN_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        ServerConfig::from_lookup(|name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.frontend_url, None);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[("PORT", "8080"), ("FRONTEND_URL", "https://board.example.com/")]).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.origin_allowed("https://board.example.com"));
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(load(&[("PORT", "http")]), Err(ConfigError::InvalidPort(_))));
        assert!(matches!(load(&[("PORT", "0")]), Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn test_origin_allow_list() {
        let config = ServerConfig::default();
        assert!(config.origin_allowed("http://localhost:5173"));
        assert!(config.origin_allowed("http://localhost:4173"));
        assert!(config.origin_allowed("https://inkboard.netlify.app"));
        assert!(!config.origin_allowed("http://localhost:3000"));
        assert!(!config.origin_allowed("https://evil.example.com"));
        // An unset FRONTEND_URL never matches an empty origin.
        assert!(!config.origin_allowed(""));
    }
}
