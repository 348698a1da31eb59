//! Engine configuration
//!
//! Every field has a default, so an empty YAML document is a valid config.
//!
//! ```yaml
//! vertex_capacity: 4096
//! snapshot:
//!   compression: true
//!   compression_level: 6
//!   max_payload_bytes: 1073741824
//! ```

use crate::persistence::codec::DEFAULT_MAX_PAYLOAD;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Graph engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Adjacency entries preallocated when a graph is opened
    pub vertex_capacity: usize,
    /// Snapshot settings
    pub snapshot: SnapshotConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            vertex_capacity: 1024,
            snapshot: SnapshotConfig::default(),
        }
    }
}

/// Snapshot encoding settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Gzip the snapshot payload
    pub compression: bool,
    /// Gzip level, 0-9
    pub compression_level: u32,
    /// Largest payload a compressed snapshot may expand to
    pub max_payload_bytes: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            compression: true,
            compression_level: 6,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl GraphConfig {
    /// Parse a configuration from a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }
}
