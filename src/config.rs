//! Store configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Default shared log root, relative to the working directory.
pub const DEFAULT_LOG_ROOT: &str = "./.logs/";

/// Settings shared by the record store and the dashboard.
///
/// ```rust
/// use exptrack::StoreConfig;
///
/// let config: StoreConfig = serde_yaml::from_str("log_root: /data/runs\n").unwrap();
/// assert_eq!(config.log_root.to_str(), Some("/data/runs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one subdirectory per experiment
    pub log_root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            log_root: PathBuf::from(DEFAULT_LOG_ROOT),
        }
    }
}

impl StoreConfig {
    /// Load configuration from a YAML file; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}
