//! Configuration module for Stratum
//!
//! Configuration hierarchy:
//! 1. Environment variables (STRATUM_*)
//! 2. Config file (`stratum.toml`, location chosen by the embedding tool)
//! 3. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{load_with_warnings, with_env_overrides, ConfigIssue, ConfigWarning};
pub use types::{CacheConfig, EngineConfig, ResolutionConfig};
