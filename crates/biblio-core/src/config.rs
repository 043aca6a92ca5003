//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! API base URL, request timeout, which session store backend to use, and
//! the last email used to log in.
//!
//! Configuration is stored at `~/.config/biblio/config.json`. The
//! `BIBLIO_BASE_URL` and `BIBLIO_SESSION_BACKEND` environment variables
//! override the file.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "biblio";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ENV_BASE_URL: &str = "BIBLIO_BASE_URL";
const ENV_SESSION_BACKEND: &str = "BIBLIO_SESSION_BACKEND";

/// Where the persisted session lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "keyring" | "keychain" => Ok(Self::Keyring),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow::anyhow!("Unknown session backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub session_backend: SessionBackend,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_backend: SessionBackend::default(),
            last_email: None,
        }
    }
}

impl Config {
    /// Load from disk, falling back to defaults, then apply env overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_SESSION_BACKEND) {
            match raw.parse() {
                Ok(backend) => self.session_backend = backend,
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_SESSION_BACKEND),
            }
        }
    }

    /// Base URL without a trailing slash
    pub fn api_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base(), "http://localhost:5000");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.session_backend, SessionBackend::File);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"session_backend": "keyring"}"#).unwrap();
        assert_eq!(config.session_backend, SessionBackend::Keyring);
        assert_eq!(config.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "BIBLIO_BASE_URL" => Some("https://library.example.org/".to_string()),
            "BIBLIO_SESSION_BACKEND" => Some("Memory".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base(), "https://library.example.org");
        assert_eq!(config.session_backend, SessionBackend::Memory);
    }

    #[test]
    fn test_bad_backend_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| (key == "BIBLIO_SESSION_BACKEND").then(|| "floppy".to_string()));
        assert_eq!(config.session_backend, SessionBackend::File);
    }
}
