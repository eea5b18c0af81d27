//! Configuration type definitions

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Diagnostics, DEFAULT_DIAGNOSTIC_LIMIT};
use crate::error::ConfigResult;

use super::loader::{self, ConfigWarning};

/// Resolution and extraction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Capacity of a diagnostics list before appending fails
    #[serde(default = "default_max_diagnostics")]
    pub max_diagnostics: usize,

    /// Sub-trait names a delta may not declare
    #[serde(default)]
    pub reserved_names: Vec<String>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_diagnostics: default_max_diagnostics(),
            reserved_names: Vec::new(),
        }
    }
}

impl ResolutionConfig {
    /// An empty diagnostics list sized for this configuration.
    pub fn new_diagnostics(&self) -> Diagnostics {
        Diagnostics::with_limit(self.max_diagnostics)
    }
}

fn default_max_diagnostics() -> usize {
    DEFAULT_DIAGNOSTIC_LIMIT
}

/// Cache table settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Memoize resolved definitions
    #[serde(default = "default_true")]
    pub definitions: bool,

    /// Memoize resolved type signatures
    #[serde(default = "default_true")]
    pub signatures: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            definitions: true,
            signatures: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub resolution: ResolutionConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> ConfigResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply environment variable overrides (STRATUM_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }
}
