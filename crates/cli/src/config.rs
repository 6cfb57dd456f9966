// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Configuration is stored in `<data dir>/trackmate.toml` and includes:
//! - `endpoint`: base URL of the collection server
//! - timeouts, the minimum interval between sync passes, and the retry ceiling
//!
//! Every field has a default, so a missing file or a partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env;
use crate::error::{Error, Result};
use crate::sync::SyncSettings;

pub const CONFIG_FILE_NAME: &str = "trackmate.toml";
pub const LOCK_FILE_NAME: &str = "sync.lock";
pub const LOG_FILE_NAME: &str = "trackmate.log";
const DATA_DIR_NAME: &str = "trackmate";

/// Engine configuration stored in `trackmate.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the collection endpoint (default: the public TrackMate server).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Time budget for one submit in seconds (default: 30).
    #[serde(default = "default_submit_timeout_secs")]
    pub submit_timeout_secs: u64,
    /// Minimum seconds between two attempted sync passes (default: 300).
    #[serde(default = "default_min_sync_interval_secs")]
    pub min_sync_interval_secs: u64,
    /// Failed deliveries after which a record is dropped (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Seconds between health probes while running (default: 30).
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    /// Time budget for one health probe in seconds (default: 5).
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://trackmateserver.onrender.com".to_string()
}

fn default_submit_timeout_secs() -> u64 {
    30
}

fn default_min_sync_interval_secs() -> u64 {
    300
}

fn default_max_attempts() -> u32 {
    5
}

fn default_probe_interval_secs() -> u64 {
    30
}

fn default_probe_timeout_secs() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: default_endpoint(),
            submit_timeout_secs: default_submit_timeout_secs(),
            min_sync_interval_secs: default_min_sync_interval_secs(),
            max_attempts: default_max_attempts(),
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, which must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Load configuration from `path`, falling back to defaults if it is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Replace the endpoint if an override is given.
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        self
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(Error::Config(format!(
                "endpoint must be an http:// or https:// URL, got '{}'",
                self.endpoint
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".to_string()));
        }
        for (name, value) in [
            ("submit_timeout_secs", self.submit_timeout_secs),
            ("probe_interval_secs", self.probe_interval_secs),
            ("probe_timeout_secs", self.probe_timeout_secs),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{} must be greater than 0", name)));
            }
        }
        Ok(())
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            min_interval: Duration::from_secs(self.min_sync_interval_secs),
            max_attempts: self.max_attempts,
            submit_timeout: self.submit_timeout(),
        }
    }
}

/// Pick the data directory: explicit flag, then `TRACKMATE_DATA_DIR`, then
/// the platform's local data directory.
pub fn resolve_data_dir(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env::data_dir() {
        return Ok(dir);
    }
    dirs::data_local_dir()
        .map(|d| d.join(DATA_DIR_NAME))
        .ok_or(Error::NoDataDir)
}

/// Pick the config file: explicit flag, then `TRACKMATE_CONFIG`, then
/// `trackmate.toml` in the data directory. The flag reports whether the
/// path was given explicitly and so must exist.
pub fn resolve_config_path(flag: Option<&Path>, data_dir: &Path) -> (PathBuf, bool) {
    if let Some(path) = flag {
        return (path.to_path_buf(), true);
    }
    if let Some(path) = env::config_path() {
        return (path, true);
    }
    (data_dir.join(CONFIG_FILE_NAME), false)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
