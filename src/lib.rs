//! Stratum - layered definition resolution engine
//!
//! Definitions are stored as deltas against a named base. Stratum resolves
//! a stored derivation chain into one fully merged definition, extracts the
//! minimal delta when a merged definition is stored back, and caches
//! resolved results with dependency-aware invalidation.
//!
//! Callers normally talk to a [`CacheEngine`], which delegates misses to an
//! [`Extractor`], which resolves through a [`Resolver`], which reads from a
//! [`Repository`].

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use config::{CacheConfig, EngineConfig, ResolutionConfig};
pub use domain::entities::{
    Behavior, Definition, Description, Direction, Interface, Origin, Parameter, Property,
    ReturnValue, Visibility,
};
pub use domain::ports::Repository;
pub use domain::services::{
    compose_delta, extract_definition, resolve, CacheEngine, CacheStats, Composable, Extractor,
    Resolver,
};
pub use domain::value_objects::{
    DefinitionKind, Diagnostic, DiagnosticKind, Diagnostics, Mode, QualifiedName, Severity,
};
pub use error::{ConfigError, DefinitionError, RepositoryError, StratumResult};
pub use infrastructure::InMemoryRepository;
