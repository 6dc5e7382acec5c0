// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings come from an optional YAML file: `$OVERLAY_DECK_CONFIG` if set,
//! otherwise `overlay-deck.yaml` in the working directory. Missing keys take
//! their defaults. `$OVERLAY_DECK_API_URL` overrides the backend URL.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_ENV: &str = "OVERLAY_DECK_CONFIG";
const API_URL_ENV: &str = "OVERLAY_DECK_API_URL";
const DEFAULT_CONFIG_FILE: &str = "overlay-deck.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the backend REST API
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Wait after the conversion service accepts a stream before attaching the player
    pub start_settle_ms: u64,
    /// Wait after a fullscreen transition before re-measuring the surface
    pub fullscreen_settle_ms: u64,
    /// Inactivity window after which a selected overlay is deselected
    pub selection_timeout_ms: u64,
    /// How long notices stay on screen
    pub notice_duration_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5001/api".to_string(),
            request_timeout_secs: 30,
            start_settle_ms: 2000,
            fullscreen_settle_ms: 50,
            selection_timeout_ms: 5000,
            notice_duration_ms: 4000,
        }
    }
}

impl AppConfig {
    /// Load from the configured location, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            let config = Self::from_file(&path)?;
            log::info!("Loaded config from {}", path.display());
            config
        } else {
            log::info!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api_base_url = url;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn start_settle(&self) -> Duration {
        Duration::from_millis(self.start_settle_ms)
    }

    pub fn fullscreen_settle(&self) -> Duration {
        Duration::from_millis(self.fullscreen_settle_ms)
    }

    pub fn selection_timeout(&self) -> Duration {
        Duration::from_millis(self.selection_timeout_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml("api_base_url: http://media-box:5000/api\nstart_settle_ms: 3500\n").unwrap();
        assert_eq!(config.api_base_url, "http://media-box:5000/api");
        assert_eq!(config.start_settle(), Duration::from_millis(3500));
        assert_eq!(config.selection_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        assert!(AppConfig::from_yaml("start_settle_ms: soon").is_err());
    }

    #[test]
    fn test_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("overlay-deck-test-{}.yaml", std::process::id()));
        let config = AppConfig {
            fullscreen_settle_ms: 80,
            ..Default::default()
        };
        std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
