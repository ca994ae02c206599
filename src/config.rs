use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::search::state::DEFAULT_PAGE_SIZE;

pub const DEFAULT_CONFIG_FILE: &str = "marketplace.json";
pub const ENV_API_URL: &str = "MARKETPLACE_API_URL";
pub const ENV_CITY: &str = "MARKETPLACE_CITY";

/// Runtime configuration for the marketplace client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the marketplace REST API
    pub api_base_url: String,
    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Number of properties per page
    pub page_size: u32,
    /// Viewer's home city, used to rank nearby results first
    pub viewer_city: Option<String>,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            request_timeout_secs: 30,
            page_size: DEFAULT_PAGE_SIZE,
            viewer_city: None,
            user_agent: concat!("marketplace-scout/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (or `marketplace.json` when present),
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("No config file, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay values from the environment (or any other lookup).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(city) = lookup(ENV_CITY) {
            let city = city.trim();
            self.viewer_city = (!city.is_empty()).then(|| city.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "api_base_url": "https://api.example.com", "page_size": 24 }}"#)
            .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.page_size, 24);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.viewer_city.is_none());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(AppConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_API_URL, "https://staging.example.com"), (ENV_CITY, " Pune ")]);
        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "https://staging.example.com");
        assert_eq!(config.viewer_city.as_deref(), Some("Pune"));
    }

    #[test]
    fn blank_city_override_clears_city() {
        let mut config = AppConfig {
            viewer_city: Some("Mumbai".to_string()),
            ..AppConfig::default()
        };
        config.apply_overrides(|key| (key == ENV_CITY).then(String::new));
        assert!(config.viewer_city.is_none());
    }
}
