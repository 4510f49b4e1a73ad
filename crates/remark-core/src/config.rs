//! Configuration management for remark-rs

use crate::error::{RemarkError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Comment service settings
    pub service: ServiceConfig,
    /// Admin directory settings
    pub admin: AdminConfig,
    /// Storage settings
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file, defaults when the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| e.with_context(format!("Failed to load {}", path.display())))
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RemarkError::Config(e.to_string()))
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RemarkError::Config(e.to_string()))
    }
}

/// Comment service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Edit window in seconds, zero disables the limit
    pub edit_duration_secs: u64,
    /// Maximum comment length in characters
    pub max_comment_size: usize,
}

impl ServiceConfig {
    pub fn edit_duration(&self) -> Duration {
        Duration::from_secs(self.edit_duration_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            edit_duration_secs: 5 * 60,
            max_comment_size: 2000,
        }
    }
}

/// Admin directory configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret for IP hashing
    pub secret: String,
    /// Admin user IDs
    pub admins: Vec<String>,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding per-site data files, platform data dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}
