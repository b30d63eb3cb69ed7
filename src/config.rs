//! Configuration loading.
//!
//! Settings come from `<config dir>/randomgen/config.json` when it exists;
//! command-line flags override individual fields afterwards. Every field is
//! optional in the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::{CachePolicy, DEFAULT_FRESHNESS, DEFAULT_RETENTION, DEFAULT_SWEEP_INTERVAL};
use crate::error::ConfigError;
use crate::faker::Locale;
use crate::query::DEFAULT_ACTION_KEYWORD;

/// Directory name under the platform config dir
const CONFIG_DIR: &str = "randomgen";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Shortest sweep interval accepted from configuration
const MIN_SWEEP_INTERVAL_SECS: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Keyword the host uses to route queries here (first token only)
    pub action_keyword: String,

    /// Locale for fake names, addresses, phone numbers
    pub locale: Locale,

    /// Seconds a cached password is replayed for identical requests
    pub freshness_secs: u64,

    /// Seconds after which a sweep drops a cache entry
    pub retention_secs: u64,

    /// Seconds between cache sweeps
    pub sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            action_keyword: DEFAULT_ACTION_KEYWORD.to_string(),
            locale: Locale::default(),
            freshness_secs: DEFAULT_FRESHNESS.as_secs(),
            retention_secs: DEFAULT_RETENTION.as_secs(),
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs(),
        }
    }
}

impl Config {
    /// Default config file location, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(content)?)
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            freshness: Duration::from_secs(self.freshness_secs),
            retention: Duration::from_secs(self.retention_secs),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(MIN_SWEEP_INTERVAL_SECS))
    }
}
