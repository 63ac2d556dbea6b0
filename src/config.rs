//! Assembler configuration, read from YAML
//!
//! ```yaml
//! min_coalesce_count: 5
//! fetch_chunk_size: 100
//! assembly_priority: [GRCh38, hg19, mm10]
//! ```
//!
//! Every field is optional and falls back to its default.

use crate::assemble::MINIMUM_COALESCE_COUNT;
use crate::source::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Order assemblies appear in the filter menu
pub const DEFAULT_ASSEMBLY_PRIORITY: &[&str] = &[
    "GRCh38",
    "hg19",
    "mm10",
    "mm10-minimal",
    "mm9",
    "ce11",
    "ce10",
    "dm6",
    "dm3",
    "J02459.1",
];

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Smallest group of contributing files collapsed into one node
    pub min_coalesce_count: usize,
    /// Ids per batched lookup against the record source
    pub fetch_chunk_size: usize,
    /// Assemblies in filter-menu order
    pub assembly_priority: Vec<String>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            min_coalesce_count: MINIMUM_COALESCE_COUNT,
            fetch_chunk_size: DEFAULT_CHUNK_SIZE,
            assembly_priority: DEFAULT_ASSEMBLY_PRIORITY
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AssemblerConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Explicit path if given, else the per-user config file if it exists,
    /// else defaults
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.min_coalesce_count < 2 {
            return Err(ConfigError::Invalid(format!(
                "min_coalesce_count must be at least 2, got {}",
                self.min_coalesce_count
            )));
        }
        if self.fetch_chunk_size == 0 {
            return Err(ConfigError::Invalid("fetch_chunk_size must be positive".into()));
        }
        Ok(())
    }
}

/// `~/.config/provgraph/config.yaml` or the platform equivalent
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("provgraph").join("config.yaml"))
}
