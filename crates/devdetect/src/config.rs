//! Configuration for detectors and the reload driver

use devdetect_core::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a [`crate::Detector`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Data file loaded at construction and by file reloads
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Block readers around each reload so retired data sets are freed at once
    #[serde(default)]
    pub quiesce_readers_on_reload: bool,

    /// Period between file reloads when a driver reloads periodically
    #[serde(default = "default_reload_interval_ms")]
    pub reload_interval_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            quiesce_readers_on_reload: false,
            reload_interval_ms: default_reload_interval_ms(),
        }
    }
}

impl DetectorConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Set the data file
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    /// Enable or disable reader quiescence
    pub fn with_quiescence(mut self, enabled: bool) -> Self {
        self.quiesce_readers_on_reload = enabled;
        self
    }

    pub fn reload_interval(&self) -> Duration {
        Duration::from_millis(self.reload_interval_ms)
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("./data/devices.trie")
}

fn default_reload_interval_ms() -> u64 {
    200
}
