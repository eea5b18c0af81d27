//! Error types for Stratum
//!
//! Uses `thiserror` for library errors. Structural conflicts never surface
//! here for definitions; they are recorded as diagnostics instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::value_objects::{Diagnostic, Mode, QualifiedName};

/// Result type alias for Stratum operations
pub type StratumResult<T> = Result<T, DefinitionError>;

/// Result type alias for repository boundary operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration file could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML or a value of the wrong type
    #[error("invalid config in {}: {message}", .file.display())]
    Parse { file: PathBuf, message: String },
}

/// Failure at the repository boundary
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry cannot be stored or read back as a definition, e.g. an
    /// invalid-mode write or undecodable bytes in a persistent adapter
    #[error("corrupt entry '{name}': {message}")]
    Corrupt { name: String, message: String },

    /// Adapter-specific failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Main error type for resolution, extraction and caching
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// The base of a derivation could not be loaded
    #[error("cannot resolve '{name}': base '{base}' could not be loaded")]
    UnresolvableBase {
        name: QualifiedName,
        base: QualifiedName,
    },

    /// The base of a definition being stored could not be resolved
    #[error("cannot store '{name}': base '{base}' is missing")]
    MissingBase {
        name: QualifiedName,
        base: QualifiedName,
    },

    /// A definition was supplied in a mode the operation cannot accept
    #[error("'{name}' is in {mode} mode, which {operation} does not accept")]
    InvalidMode {
        name: QualifiedName,
        mode: Mode,
        operation: &'static str,
    },

    /// A base chain loops back on itself
    #[error("cyclic base chain: {}", format_chain(.chain))]
    CyclicBase { chain: Vec<QualifiedName> },

    /// Accumulated composition problems (fatal for type signatures)
    #[error("{} composition conflict(s) in '{name}'", .diagnostics.len())]
    CompositionConflict {
        name: QualifiedName,
        diagnostics: Vec<Diagnostic>,
    },

    /// The diagnostics list filled up
    #[error("too many diagnostics (limit {limit})")]
    DiagnosticsOverflow { limit: usize },

    /// Read/write failure at the repository boundary
    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),
}

fn format_chain(chain: &[QualifiedName]) -> String {
    chain
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
