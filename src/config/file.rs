// src/config/file.rs
// File-based configuration from ~/.expense-gateway/config.toml

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Top-level config structure
#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiSection,
    /// Extra backend message -> display message translations
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
}

/// Backend connection section
#[derive(Debug, Deserialize, Default)]
pub struct ApiSection {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub csrf_cookie: Option<String>,
}

impl FileConfig {
    /// Load config from ~/.expense-gateway/config.toml
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from an explicit path; missing or broken files fall back to defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".expense-gateway")
            .join("config.toml")
    }
}
