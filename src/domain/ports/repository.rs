//! Repository port - abstraction for definition persistence
//!
//! A repository returns exactly what was stored, unresolved. Resolution,
//! extraction and caching are layered on top of it and never depend on
//! the storage format behind it.

use crate::domain::entities::Definition;
use crate::domain::value_objects::QualifiedName;
use crate::error::RepositoryResult;

/// Storage contract consumed by the resolver and extractor.
///
/// Implementations are shared between callers, so every method takes
/// `&self`; adapters provide their own interior locking.
pub trait Repository: Send + Sync {
    /// Load a stored definition (`None` if absent)
    fn load_definition(&self, name: &QualifiedName) -> RepositoryResult<Option<Definition>>;

    /// Load a stored type signature (`None` if absent)
    fn load_type_signature(&self, name: &QualifiedName) -> RepositoryResult<Option<Definition>>;

    /// Load the opaque compiled artifact generated for `name`
    fn load_compiled_artifact(&self, name: &QualifiedName) -> RepositoryResult<Option<Vec<u8>>>;

    /// Load a named resource blob
    fn load_resource(&self, name: &str) -> RepositoryResult<Option<Vec<u8>>>;

    fn store_definition(&self, definition: &Definition) -> RepositoryResult<()>;

    fn store_type_signature(&self, signature: &Definition) -> RepositoryResult<()>;

    /// Store a compiled artifact, optionally with a human-readable listing
    fn store_compiled_artifact(
        &self,
        name: &QualifiedName,
        bytes: &[u8],
        listing: Option<&str>,
    ) -> RepositoryResult<()>;

    fn store_resource(&self, name: &str, bytes: &[u8]) -> RepositoryResult<()>;

    fn remove_definition(&self, name: &QualifiedName) -> RepositoryResult<()>;

    fn remove_resource(&self, name: &str) -> RepositoryResult<()>;

    /// Names of the definitions stored directly below `name`
    fn sub_definitions(&self, name: &QualifiedName) -> RepositoryResult<Vec<QualifiedName>>;

    /// Names of the definitions stored in `package`
    fn package_definitions(&self, package: &str) -> RepositoryResult<Vec<QualifiedName>>;

    /// Packages nested directly in `package`
    fn sub_packages(&self, package: &str) -> RepositoryResult<Vec<String>>;
}
