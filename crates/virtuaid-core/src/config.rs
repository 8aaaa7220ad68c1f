//! Application configuration management.
//!
//! This module handles loading and saving the console configuration: the
//! backend base URL, the refresh cookie name, request timeouts, and the last
//! email used to sign in.
//!
//! Configuration is stored at `~/.config/virtuaid-admin/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "virtuaid-admin";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Preference file name (the console's local storage)
const PREFERENCES_FILE: &str = "preferences.json";

/// Environment variable overriding the backend base URL
pub const API_BASE_URL_ENV: &str = "VIRTUAID_API_BASE_URL";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

const DEFAULT_SESSION_COOKIE: &str = "refresh_token";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound on the whole silent re-authentication flow.
const DEFAULT_REAUTH_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub session_cookie_name: String,
    pub request_timeout_secs: u64,
    /// `0` disables the timeout.
    pub reauth_timeout_secs: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            reauth_timeout_secs: DEFAULT_REAUTH_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults when it does not exist.
    /// `VIRTUAID_API_BASE_URL` takes precedence over the stored base URL.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_env();
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

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
    }

    fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME))
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    pub fn preferences_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(PREFERENCES_FILE))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reauth_timeout(&self) -> Option<Duration> {
        (self.reauth_timeout_secs > 0).then(|| Duration::from_secs(self.reauth_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{"api_base_url": "https://admin.example.org/api"}"#;
        let config: Config = serde_json::from_str(json).expect("Failed to parse config test JSON");
        assert_eq!(config.api_base_url, "https://admin.example.org/api");
        assert_eq!(config.session_cookie_name, "refresh_token");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.reauth_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_zero_reauth_timeout_disables_it() {
        let config = Config {
            reauth_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.reauth_timeout(), None);
    }
}
