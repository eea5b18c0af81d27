//! In-memory Repository
//!
//! Implements the Repository port on top of ordered maps. Used by tests
//! and by embedding tools that assemble definitions programmatically.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::entities::Definition;
use crate::domain::ports::Repository;
use crate::domain::value_objects::{Mode, QualifiedName};
use crate::error::{RepositoryError, RepositoryResult};

#[derive(Debug, Default)]
struct Store {
    definitions: BTreeMap<QualifiedName, Definition>,
    signatures: BTreeMap<QualifiedName, Definition>,
    artifacts: BTreeMap<QualifiedName, (Vec<u8>, Option<String>)>,
    resources: BTreeMap<String, Vec<u8>>,
}

/// Repository that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seed a stored definition
    pub fn with_definition(self, definition: Definition) -> Self {
        self.write()
            .definitions
            .insert(definition.name().clone(), definition);
        self
    }

    /// Builder: seed a stored type signature
    pub fn with_signature(self, signature: Definition) -> Self {
        self.write()
            .signatures
            .insert(signature.name().clone(), signature);
        self
    }

    /// Listing stored alongside a compiled artifact, if any
    pub fn artifact_listing(&self, name: &QualifiedName) -> Option<String> {
        self.read()
            .artifacts
            .get(name)
            .and_then(|(_, listing)| listing.clone())
    }

    pub fn definition_count(&self) -> usize {
        self.read().definitions.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An invalid-mode entry could never be resolved again, so it is refused
/// at the write boundary. The `with_*` builders seed without this check.
fn storable(definition: &Definition) -> RepositoryResult<()> {
    if definition.mode() == Mode::Invalid {
        return Err(RepositoryError::Corrupt {
            name: definition.name().as_str().to_string(),
            message: "refusing to store an entry in invalid mode".to_string(),
        });
    }
    Ok(())
}

impl Repository for InMemoryRepository {
    fn load_definition(&self, name: &QualifiedName) -> RepositoryResult<Option<Definition>> {
        Ok(self.read().definitions.get(name).cloned())
    }

    fn load_type_signature(&self, name: &QualifiedName) -> RepositoryResult<Option<Definition>> {
        Ok(self.read().signatures.get(name).cloned())
    }

    fn load_compiled_artifact(&self, name: &QualifiedName) -> RepositoryResult<Option<Vec<u8>>> {
        Ok(self.read().artifacts.get(name).map(|(bytes, _)| bytes.clone()))
    }

    fn load_resource(&self, name: &str) -> RepositoryResult<Option<Vec<u8>>> {
        Ok(self.read().resources.get(name).cloned())
    }

    fn store_definition(&self, definition: &Definition) -> RepositoryResult<()> {
        storable(definition)?;
        self.write()
            .definitions
            .insert(definition.name().clone(), definition.clone());
        Ok(())
    }

    fn store_type_signature(&self, signature: &Definition) -> RepositoryResult<()> {
        storable(signature)?;
        self.write()
            .signatures
            .insert(signature.name().clone(), signature.clone());
        Ok(())
    }

    fn store_compiled_artifact(
        &self,
        name: &QualifiedName,
        bytes: &[u8],
        listing: Option<&str>,
    ) -> RepositoryResult<()> {
        self.write().artifacts.insert(
            name.clone(),
            (bytes.to_vec(), listing.map(str::to_string)),
        );
        Ok(())
    }

    fn store_resource(&self, name: &str, bytes: &[u8]) -> RepositoryResult<()> {
        self.write()
            .resources
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    /// Removes the definition, a type signature of the same name, and any
    /// compiled artifact generated from it.
    fn remove_definition(&self, name: &QualifiedName) -> RepositoryResult<()> {
        let mut store = self.write();
        store.definitions.remove(name);
        store.signatures.remove(name);
        store.artifacts.remove(name);
        Ok(())
    }

    fn remove_resource(&self, name: &str) -> RepositoryResult<()> {
        self.write().resources.remove(name);
        Ok(())
    }

    fn sub_definitions(&self, name: &QualifiedName) -> RepositoryResult<Vec<QualifiedName>> {
        Ok(self
            .read()
            .definitions
            .keys()
            .filter(|n| n.parent().as_ref() == Some(name))
            .cloned()
            .collect())
    }

    fn package_definitions(&self, package: &str) -> RepositoryResult<Vec<QualifiedName>> {
        Ok(self
            .read()
            .definitions
            .keys()
            .filter(|n| !n.is_root() && n.package() == package)
            .cloned()
            .collect())
    }

    fn sub_packages(&self, package: &str) -> RepositoryResult<Vec<String>> {
        let store = self.read();
        let mut packages = BTreeSet::new();
        for name in store.definitions.keys() {
            // every prefix of a definition's package is itself a package
            let mut current = QualifiedName::new(name.package());
            while !current.is_root() {
                if current.package() == package {
                    packages.insert(current.as_str().to_string());
                }
                current = match current.parent() {
                    Some(parent) => parent,
                    None => break,
                };
            }
        }
        Ok(packages.into_iter().collect())
    }
}
