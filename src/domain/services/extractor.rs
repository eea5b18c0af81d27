//! Extractor
//!
//! Persists resolved definitions as minimal deltas against their resolved
//! base, and loads them back through the [`Resolver`].

use std::sync::Arc;

use crate::config::ResolutionConfig;
use crate::domain::entities::Definition;
use crate::domain::ports::Repository;
use crate::domain::services::composition::extract_definition;
use crate::domain::services::resolver::Resolver;
use crate::domain::value_objects::{DefinitionKind, Diagnostics, Mode, QualifiedName};
use crate::error::{DefinitionError, StratumResult};

/// Storage-side engine: resolve on load, subtract on store.
#[derive(Debug, Clone)]
pub struct Extractor {
    resolver: Resolver,
}

impl Extractor {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self {
            resolver: Resolver::new(repository),
        }
    }

    pub fn with_config(repository: Arc<dyn Repository>, config: ResolutionConfig) -> Self {
        Self {
            resolver: Resolver::with_config(repository, config),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        self.resolver.repository()
    }

    pub fn load_definition(
        &self,
        name: &QualifiedName,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<Option<Definition>> {
        self.resolver.resolve_definition(name, diagnostics)
    }

    pub fn load_type_signature(&self, name: &QualifiedName) -> StratumResult<Option<Definition>> {
        self.resolver.resolve_type_signature(name)
    }

    /// Store a resolved definition or type signature as a delta against
    /// its resolved base.
    pub fn store(&self, definition: &Definition, diagnostics: &mut Diagnostics) -> StratumResult<()> {
        match definition.kind() {
            DefinitionKind::Component => self.store_definition(definition, diagnostics),
            DefinitionKind::Signature => self.store_type_signature(definition, diagnostics),
        }
    }

    /// Delete `name` from the repository. No extraction takes place.
    pub fn remove(&self, name: &QualifiedName) -> StratumResult<()> {
        tracing::debug!(name = %name, "removing definition");
        self.repository().remove_definition(name)?;
        Ok(())
    }

    fn store_definition(
        &self,
        definition: &Definition,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<()> {
        let name = definition.name();
        require_resolved(definition)?;

        let Some(base_name) = definition.base_name() else {
            tracing::info!("storing root definition unchanged");
            self.repository().store_definition(definition)?;
            return Ok(());
        };

        let base = self
            .resolver
            .resolve_definition(&base_name, diagnostics)
            .map_err(|err| missing_base(err, name, &base_name))?
            .ok_or_else(|| DefinitionError::MissingBase {
                name: name.clone(),
                base: base_name.clone(),
            })?;

        let delta = extract_definition(definition, &base, diagnostics)?;
        tracing::debug!(name = %name, base = %base_name, "storing extracted derivation");
        self.repository().store_definition(&delta)?;
        Ok(())
    }

    fn store_type_signature(
        &self,
        signature: &Definition,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<()> {
        let name = signature.name();

        if signature.super_name().is_none() && !signature.is_interface() {
            // the bootstrap type is the only signature stored resolved
            require_resolved(signature)?;
            tracing::info!(name = %name, "storing bootstrap type signature unchanged");
            self.repository().store_type_signature(signature)?;
            return Ok(());
        }
        require_resolved(signature)?;

        let base = match signature.super_name() {
            Some(base_name) if !signature.is_interface() => self
                .resolver
                .resolve_type_signature(base_name)
                .map_err(|err| missing_base(err, name, base_name))?
                .ok_or_else(|| DefinitionError::MissingBase {
                    name: name.clone(),
                    base: base_name.clone(),
                })?,
            _ => Definition::blank(QualifiedName::root(), DefinitionKind::Signature),
        };

        let delta = extract_definition(signature, &base, diagnostics)?;
        if delta.mode() != Mode::Derivation {
            return Err(DefinitionError::InvalidMode {
                name: name.clone(),
                mode: delta.mode(),
                operation: "store",
            });
        }

        tracing::debug!(name = %name, interface = signature.is_interface(), "storing extracted signature");
        self.repository().store_type_signature(&delta)?;
        Ok(())
    }

    pub fn load_compiled_artifact(&self, name: &QualifiedName) -> StratumResult<Option<Vec<u8>>> {
        Ok(self.repository().load_compiled_artifact(name)?)
    }

    pub fn store_compiled_artifact(
        &self,
        name: &QualifiedName,
        bytes: &[u8],
        listing: Option<&str>,
    ) -> StratumResult<()> {
        Ok(self.repository().store_compiled_artifact(name, bytes, listing)?)
    }

    pub fn load_resource(&self, name: &str) -> StratumResult<Option<Vec<u8>>> {
        Ok(self.repository().load_resource(name)?)
    }

    pub fn store_resource(&self, name: &str, bytes: &[u8]) -> StratumResult<()> {
        Ok(self.repository().store_resource(name, bytes)?)
    }

    pub fn remove_resource(&self, name: &str) -> StratumResult<()> {
        Ok(self.repository().remove_resource(name)?)
    }

    pub fn sub_definitions(&self, name: &QualifiedName) -> StratumResult<Vec<QualifiedName>> {
        Ok(self.repository().sub_definitions(name)?)
    }

    pub fn package_definitions(&self, package: &str) -> StratumResult<Vec<QualifiedName>> {
        Ok(self.repository().package_definitions(package)?)
    }

    pub fn sub_packages(&self, package: &str) -> StratumResult<Vec<String>> {
        Ok(self.repository().sub_packages(package)?)
    }
}

fn require_resolved(definition: &Definition) -> StratumResult<()> {
    if definition.mode() != Mode::Resolved {
        return Err(DefinitionError::InvalidMode {
            name: definition.name().clone(),
            mode: definition.mode(),
            operation: "store",
        });
    }
    Ok(())
}

/// A base that cannot be resolved anywhere along its chain means the
/// stored definition has nothing to be extracted against.
fn missing_base(err: DefinitionError, name: &QualifiedName, base: &QualifiedName) -> DefinitionError {
    match err {
        DefinitionError::UnresolvableBase { .. } => DefinitionError::MissingBase {
            name: name.clone(),
            base: base.clone(),
        },
        other => other,
    }
}
