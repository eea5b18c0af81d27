//! Resolver
//!
//! Turns a stored derivation chain into one resolved definition: load the
//! delta, resolve its base recursively, compose, then finalize the result
//! (interface expansion). The repository is always passed in explicitly.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::config::ResolutionConfig;
use crate::domain::entities::Definition;
use crate::domain::ports::Repository;
use crate::domain::services::composition::{Composable, Composition, TraitKind};
use crate::domain::value_objects::{
    DefinitionKind, Diagnostic, DiagnosticKind, Diagnostics, Mode, QualifiedName, Severity,
};
use crate::error::{DefinitionError, StratumResult};

/// Resolve `name` against `repository` with default settings.
pub fn resolve(
    repository: &dyn Repository,
    name: &QualifiedName,
    diagnostics: &mut Diagnostics,
) -> StratumResult<Option<Definition>> {
    let config = ResolutionConfig::default();
    Resolution::new(repository, &config).definition(name, diagnostics)
}

/// Resolves definitions and type signatures from a shared repository.
#[derive(Clone)]
pub struct Resolver {
    repository: Arc<dyn Repository>,
    config: ResolutionConfig,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self::with_config(repository, ResolutionConfig::default())
    }

    pub fn with_config(repository: Arc<dyn Repository>, config: ResolutionConfig) -> Self {
        Self { repository, config }
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    pub fn config(&self) -> &ResolutionConfig {
        &self.config
    }

    /// Resolve a definition, recording non-fatal conflicts in `diagnostics`.
    ///
    /// Returns `Ok(None)` if `name` is not stored.
    pub fn resolve_definition(
        &self,
        name: &QualifiedName,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<Option<Definition>> {
        Resolution::new(self.repository.as_ref(), &self.config).definition(name, diagnostics)
    }

    /// Resolve a type signature. Any composition conflict is fatal and
    /// reported as one aggregated [`DefinitionError::CompositionConflict`].
    pub fn resolve_type_signature(&self, name: &QualifiedName) -> StratumResult<Option<Definition>> {
        Resolution::new(self.repository.as_ref(), &self.config).checked_signature(name)
    }
}

/// State of one top-level resolve call.
struct Resolution<'r> {
    repository: &'r dyn Repository,
    config: &'r ResolutionConfig,
    /// Definitions currently being resolved, outermost first
    stack: Vec<(DefinitionKind, QualifiedName)>,
}

impl<'r> Resolution<'r> {
    fn new(repository: &'r dyn Repository, config: &'r ResolutionConfig) -> Self {
        Self {
            repository,
            config,
            stack: Vec::new(),
        }
    }

    fn definition(
        &mut self,
        name: &QualifiedName,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<Option<Definition>> {
        self.enter(DefinitionKind::Component, name)?;
        let result = self.load_definition(name, diagnostics);
        self.stack.pop();
        result
    }

    fn load_definition(
        &mut self,
        name: &QualifiedName,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<Option<Definition>> {
        let Some(stored) = self.repository.load_definition(name)? else {
            return Ok(None);
        };

        match stored.mode() {
            Mode::Resolved => {
                if !name.is_root() {
                    tracing::debug!(name = %name, "stored definition is already resolved");
                }
                Ok(Some(stored))
            }
            Mode::Derivation => {
                let base_name = stored.base_name().ok_or(DefinitionError::InvalidMode {
                    name: name.clone(),
                    mode: stored.mode(),
                    operation: "resolve",
                })?;

                tracing::debug!(name = %name, base = %base_name, "resolving base definition");
                let base = self.definition(&base_name, diagnostics)?.ok_or_else(|| {
                    DefinitionError::UnresolvableBase {
                        name: name.clone(),
                        base: base_name.clone(),
                    }
                })?;

                if base.is_final() {
                    diagnostics.push(Diagnostic::warning(
                        DiagnosticKind::SealedOverride,
                        format!("derives from final definition '{}'", base_name),
                        name.as_str(),
                    ))?;
                }

                self.compose_and_finalize(base_name, &base, &stored, diagnostics)
                    .map(Some)
            }
            mode => Err(DefinitionError::InvalidMode {
                name: name.clone(),
                mode,
                operation: "resolve",
            }),
        }
    }

    /// Resolve a type signature with a private diagnostics list, turning any
    /// conflict into a fatal aggregated error.
    fn checked_signature(&mut self, name: &QualifiedName) -> StratumResult<Option<Definition>> {
        let mut diagnostics = self.config.new_diagnostics();
        let resolved = self.signature(name, &mut diagnostics)?;
        if diagnostics.has_conflicts() {
            return Err(DefinitionError::CompositionConflict {
                name: name.clone(),
                diagnostics: diagnostics
                    .into_vec()
                    .into_iter()
                    .filter(Diagnostic::is_conflict)
                    .collect(),
            });
        }
        Ok(resolved)
    }

    fn signature(
        &mut self,
        name: &QualifiedName,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<Option<Definition>> {
        self.enter(DefinitionKind::Signature, name)?;
        let result = self.load_signature(name, diagnostics);
        self.stack.pop();
        result
    }

    fn load_signature(
        &mut self,
        name: &QualifiedName,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<Option<Definition>> {
        let Some(stored) = self.repository.load_type_signature(name)? else {
            return Ok(None);
        };

        match stored.mode() {
            Mode::Resolved => Ok(Some(stored)),
            Mode::Derivation if stored.is_interface() => {
                // interfaces never inherit from their nominal super type
                let base = Definition::blank(QualifiedName::root(), DefinitionKind::Signature);
                let mut resolved = self.compose(&base, &stored, diagnostics)?;
                self.finalize(&mut resolved, diagnostics)?;
                Ok(Some(resolved))
            }
            Mode::Derivation => {
                let base_name = stored.super_name().cloned().ok_or(DefinitionError::InvalidMode {
                    name: name.clone(),
                    mode: stored.mode(),
                    operation: "resolve",
                })?;

                tracing::debug!(name = %name, base = %base_name, "resolving base signature");
                let base = self.signature(&base_name, diagnostics)?.ok_or_else(|| {
                    DefinitionError::UnresolvableBase {
                        name: name.clone(),
                        base: base_name.clone(),
                    }
                })?;

                self.compose_and_finalize(base_name, &base, &stored, diagnostics)
                    .map(Some)
            }
            mode => Err(DefinitionError::InvalidMode {
                name: name.clone(),
                mode,
                operation: "resolve",
            }),
        }
    }

    fn compose_and_finalize(
        &mut self,
        base_name: QualifiedName,
        base: &Definition,
        delta: &Definition,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<Definition> {
        let mut resolved = self.compose(base, delta, diagnostics)?;

        let mut ancestry = Vec::with_capacity(base.ancestry().len() + 1);
        ancestry.push(base_name);
        ancestry.extend(base.ancestry().iter().cloned());
        resolved.set_ancestry(ancestry);

        self.finalize(&mut resolved, diagnostics)?;
        Ok(resolved)
    }

    fn compose(
        &self,
        base: &Definition,
        delta: &Definition,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<Definition> {
        let mut cx = Composition::new(delta.name().as_str(), diagnostics)
            .with_reserved_names(&self.config.reserved_names);
        base.compose(delta, &mut cx)
    }

    /// Reconcile what structural composition cannot: expand implemented
    /// interfaces, drop behaviors of interfaces no longer implemented,
    /// and force every remaining element into resolved mode.
    fn finalize(
        &mut self,
        definition: &mut Definition,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<()> {
        let path = definition.name().as_str().to_string();
        let listed: BTreeSet<String> = definition.interfaces().keys().cloned().collect();

        let mut loaded = BTreeMap::new();
        for interface in &listed {
            let interface_name = QualifiedName::new(interface);
            let location = format!("{}/{}", path, TraitKind::Interface.segment(interface));
            match self.checked_signature(&interface_name) {
                Ok(Some(signature)) => {
                    loaded.insert(interface.clone(), signature);
                }
                Ok(None) => diagnostics.push(Diagnostic::new(
                    DiagnosticKind::Orphaned,
                    Severity::Error,
                    format!("interface '{}' could not be loaded", interface),
                    location,
                ))?,
                Err(err @ (DefinitionError::Repository(_) | DefinitionError::DiagnosticsOverflow { .. })) => {
                    return Err(err)
                }
                Err(err) => diagnostics.push(Diagnostic::new(
                    DiagnosticKind::Orphaned,
                    Severity::Error,
                    format!("interface '{}' is unusable: {}", interface, err),
                    location,
                ))?,
            }
        }

        let mut stale = Vec::new();
        for (key, behavior) in definition.behaviors_mut().iter_mut() {
            if !behavior.origin_mut().retain_interfaces(|i| listed.contains(i)) {
                stale.push(key.clone());
            }
        }
        for key in stale {
            definition.behaviors_mut().remove(&key);
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::Orphaned,
                "behavior belongs to an interface that is no longer implemented",
                format!("{}/{}", path, TraitKind::Behavior.segment(&key)),
            ))?;
        }

        for (interface, signature) in &loaded {
            for (key, behavior) in signature.behaviors() {
                match definition.behaviors_mut().get_mut(key) {
                    Some(existing) => existing.origin_mut().add_interface(interface),
                    None => {
                        definition
                            .behaviors_mut()
                            .insert(key.clone(), behavior.expanded_from(interface));
                    }
                }
            }
        }

        force_resolved(definition.properties_mut(), &path, diagnostics)?;
        force_resolved(definition.behaviors_mut(), &path, diagnostics)?;
        force_resolved(definition.interfaces_mut(), &path, diagnostics)?;
        force_resolved(definition.children_mut(), &path, diagnostics)?;

        for child in definition.children_mut().values_mut() {
            self.finalize(child, diagnostics)?;
        }
        Ok(())
    }

    fn enter(&mut self, kind: DefinitionKind, name: &QualifiedName) -> StratumResult<()> {
        if let Some(start) = self
            .stack
            .iter()
            .position(|(k, n)| *k == kind && n == name)
        {
            let mut chain: Vec<QualifiedName> =
                self.stack[start..].iter().map(|(_, n)| n.clone()).collect();
            chain.push(name.clone());
            return Err(DefinitionError::CyclicBase { chain });
        }
        self.stack.push((kind, name.clone()));
        Ok(())
    }
}

fn force_resolved<T: Composable>(
    table: &mut BTreeMap<String, T>,
    path: &str,
    diagnostics: &mut Diagnostics,
) -> StratumResult<()> {
    for (key, item) in table.iter_mut() {
        let mode = item.mode();
        if mode != Mode::Resolved {
            tracing::debug!(path, key = %key, %mode, "forcing element into resolved mode");
            item.set_mode(Mode::Resolved);
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::ForcedResolve,
                Severity::Info,
                format!("{} left in {} mode after composition", T::KIND.label(), mode),
                format!("{}/{}", path, T::KIND.segment(key)),
            ))?;
        }
    }
    Ok(())
}
