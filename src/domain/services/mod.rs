//! Domain Services
//!
//! The composition rule shared by every sub-trait, and the three engines
//! layered on top of a repository: Resolver, Extractor, CacheEngine.

pub mod cache_engine;
pub mod composition;
pub mod extractor;
pub mod resolver;

pub use cache_engine::{CacheEngine, CacheStats};
pub use composition::{
    compose_delta, compose_item, compose_table, extract_definition, subtract_table, Composable,
    Composition, TraitKind,
};
pub use extractor::Extractor;
pub use resolver::{resolve, Resolver};
