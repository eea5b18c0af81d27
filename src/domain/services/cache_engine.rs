//! CacheEngine
//!
//! Memoizes resolved definitions and type signatures in front of an
//! [`Extractor`] and evicts every entry that depends on a name once that
//! name is stored or removed through this engine.
//!
//! Both tables live behind one mutex. The lock is never held while the
//! extractor runs: misses load unlocked, and a generation counter bumped
//! by every invalidation stops a load that raced with a store from
//! caching its (stale) result.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{CacheConfig, EngineConfig};
use crate::domain::entities::Definition;
use crate::domain::ports::Repository;
use crate::domain::services::extractor::Extractor;
use crate::domain::value_objects::{DefinitionKind, Diagnostics, QualifiedName};
use crate::error::StratumResult;

/// A memoized load result; `NotFound` is cached too.
#[derive(Debug, Clone)]
enum CacheEntry {
    Found(Arc<Definition>),
    NotFound,
}

impl CacheEntry {
    fn value(&self) -> Option<Arc<Definition>> {
        match self {
            CacheEntry::Found(definition) => Some(Arc::clone(definition)),
            CacheEntry::NotFound => None,
        }
    }
}

impl From<Option<Arc<Definition>>> for CacheEntry {
    fn from(value: Option<Arc<Definition>>) -> Self {
        match value {
            Some(definition) => CacheEntry::Found(definition),
            None => CacheEntry::NotFound,
        }
    }
}

/// Hit/miss/eviction counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    definitions: HashMap<QualifiedName, CacheEntry>,
    signatures: HashMap<QualifiedName, CacheEntry>,
    generation: u64,
    stats: CacheStats,
}

#[derive(Debug, Clone, Copy)]
enum Table {
    Definitions,
    Signatures,
}

impl CacheState {
    fn table(&mut self, table: Table) -> &mut HashMap<QualifiedName, CacheEntry> {
        match table {
            Table::Definitions => &mut self.definitions,
            Table::Signatures => &mut self.signatures,
        }
    }
}

/// Memoizing front of the resolve/extract stack.
#[derive(Debug)]
pub struct CacheEngine {
    extractor: Extractor,
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl CacheEngine {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self::with_extractor(Extractor::new(repository), CacheConfig::default())
    }

    pub fn from_config(repository: Arc<dyn Repository>, config: &EngineConfig) -> Self {
        Self::with_extractor(
            Extractor::with_config(repository, config.resolution.clone()),
            config.cache,
        )
    }

    pub fn with_extractor(extractor: Extractor, config: CacheConfig) -> Self {
        Self {
            extractor,
            config,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Empty diagnostics list sized for this engine.
    pub fn new_diagnostics(&self) -> Diagnostics {
        self.extractor.resolver().config().new_diagnostics()
    }

    /// Load a resolved definition, shared with the cache.
    pub fn load_definition(
        &self,
        name: &QualifiedName,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<Option<Arc<Definition>>> {
        self.load(Table::Definitions, self.config.definitions, name, || {
            self.extractor.load_definition(name, diagnostics)
        })
    }

    /// Load a private, mutable copy of a resolved definition.
    pub fn load_definition_mut(
        &self,
        name: &QualifiedName,
        diagnostics: &mut Diagnostics,
    ) -> StratumResult<Option<Definition>> {
        Ok(self
            .load_definition(name, diagnostics)?
            .map(|shared| Definition::clone(&shared)))
    }

    pub fn load_type_signature(&self, name: &QualifiedName) -> StratumResult<Option<Arc<Definition>>> {
        self.load(Table::Signatures, self.config.signatures, name, || {
            self.extractor.load_type_signature(name)
        })
    }

    fn load(
        &self,
        table: Table,
        enabled: bool,
        name: &QualifiedName,
        fetch: impl FnOnce() -> StratumResult<Option<Definition>>,
    ) -> StratumResult<Option<Arc<Definition>>> {
        let generation = {
            let mut state = self.lock();
            if enabled {
                let cached = state.table(table).get(name).map(CacheEntry::value);
                if let Some(value) = cached {
                    state.stats.hits += 1;
                    tracing::debug!(name = %name, ?table, "cache hit");
                    return Ok(value);
                }
            }
            state.stats.misses += 1;
            state.generation
        };

        tracing::debug!(name = %name, ?table, "cache miss");
        let loaded = fetch()?.map(Arc::new);
        if !enabled {
            return Ok(loaded);
        }

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(name = %name, "load raced with invalidation; not caching");
            return Ok(loaded);
        }
        // a concurrent miss may have filled the slot first; hand out that copy
        let entry = state
            .table(table)
            .entry(name.clone())
            .or_insert_with(|| CacheEntry::from(loaded));
        Ok(entry.value())
    }

    /// Persist through the extractor, then evict everything that depended
    /// on the stored name. Eviction runs even if the store failed.
    pub fn store(&self, definition: &Definition, diagnostics: &mut Diagnostics) -> StratumResult<()> {
        let result = self.extractor.store(definition, diagnostics);
        match definition.kind() {
            DefinitionKind::Component => self.invalidate_definition(definition.name()),
            DefinitionKind::Signature => self.invalidate_type(definition.name()),
        }
        result
    }

    /// Remove `name` from the repository and evict its dependents.
    pub fn remove(&self, name: &QualifiedName) -> StratumResult<()> {
        let result = self.extractor.remove(name);
        self.invalidate_definition(name);
        self.invalidate_type(name);
        result
    }

    /// Drop every cached entry.
    pub fn flush(&self) {
        let mut state = self.lock();
        let evicted = state.definitions.len() + state.signatures.len();
        state.definitions.clear();
        state.signatures.clear();
        state.generation += 1;
        state.stats.evictions += evicted as u64;
        tracing::info!(evicted, "cache flushed");
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// True if a load result (found or not) for the definition is cached.
    pub fn contains_definition(&self, name: &QualifiedName) -> bool {
        self.lock().definitions.contains_key(name)
    }

    pub fn contains_type_signature(&self, name: &QualifiedName) -> bool {
        self.lock().signatures.contains_key(name)
    }

    fn invalidate_definition(&self, changed: &QualifiedName) {
        let mut state = self.lock();
        state.generation += 1;

        let before = state.definitions.len();
        state.definitions.retain(|name, entry| {
            name != changed
                && !matches!(entry, CacheEntry::Found(def) if def.is_derived_from(changed))
        });
        let evicted = before - state.definitions.len();
        state.stats.evictions += evicted as u64;
        tracing::debug!(name = %changed, evicted, "invalidated definition dependents");
    }

    fn invalidate_type(&self, changed: &QualifiedName) {
        // resolving during the walk may add entries; only these are judged
        let (signatures, implementors) = {
            let mut state = self.lock();
            state.generation += 1;
            let signatures: Vec<QualifiedName> = state
                .signatures
                .keys()
                .filter(|name| *name != changed)
                .cloned()
                .collect();
            let implementors: Vec<(QualifiedName, BTreeSet<QualifiedName>)> = state
                .definitions
                .iter()
                .filter_map(|(name, entry)| match entry {
                    CacheEntry::Found(def) => Some((name.clone(), def.implemented_interfaces())),
                    CacheEntry::NotFound => None,
                })
                .filter(|(_, interfaces)| !interfaces.is_empty())
                .collect();
            (signatures, implementors)
        };

        let mut walk = ImpactWalk::new(changed);
        let mut impacted: HashSet<QualifiedName> = signatures
            .into_iter()
            .filter(|name| self.reaches_changed(name, &mut walk))
            .collect();
        impacted.insert(changed.clone());

        // finalize expanded every interface reachable from the listed ones
        let stale_definitions: HashSet<QualifiedName> = implementors
            .into_iter()
            .filter(|(_, interfaces)| {
                interfaces
                    .iter()
                    .any(|interface| self.reaches_changed(interface, &mut walk))
            })
            .map(|(name, _)| name)
            .collect();

        let mut state = self.lock();
        let signatures_before = state.signatures.len();
        state.signatures.retain(|name, _| !impacted.contains(name));
        let definitions_before = state.definitions.len();
        state
            .definitions
            .retain(|name, _| !stale_definitions.contains(name));

        let evicted = (signatures_before - state.signatures.len())
            + (definitions_before - state.definitions.len());
        state.stats.evictions += evicted as u64;
        tracing::debug!(name = %changed, evicted, "invalidated type signature dependents");
    }

    /// True if `name`'s base chain or interface set reaches the changed type.
    fn reaches_changed(&self, name: &QualifiedName, walk: &mut ImpactWalk<'_>) -> bool {
        // checked before any load so malformed cyclic data terminates
        if name == walk.changed {
            return true;
        }
        if let Some(&known) = walk.memo.get(name) {
            return known;
        }
        if !walk.visiting.insert(name.clone()) {
            return false;
        }

        let impacted = match self.load_type_signature(name) {
            Ok(Some(signature)) => {
                let interfaces: Vec<QualifiedName> = signature
                    .interfaces()
                    .values()
                    .map(|i| i.name().clone())
                    .collect();
                signature
                    .ancestry()
                    .iter()
                    .chain(interfaces.iter())
                    .any(|dependency| self.reaches_changed(dependency, walk))
            }
            Ok(None) => false,
            Err(err) => {
                // TODO: distinguish transient repository failures from broken
                // definitions so an unrelated I/O hiccup does not evict `name`
                tracing::warn!(name = %name, error = %err, "type failed to load during invalidation; treating as impacted");
                true
            }
        };

        walk.visiting.remove(name);
        walk.memo.insert(name.clone(), impacted);
        impacted
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn load_compiled_artifact(&self, name: &QualifiedName) -> StratumResult<Option<Vec<u8>>> {
        self.extractor.load_compiled_artifact(name)
    }

    pub fn store_compiled_artifact(
        &self,
        name: &QualifiedName,
        bytes: &[u8],
        listing: Option<&str>,
    ) -> StratumResult<()> {
        self.extractor.store_compiled_artifact(name, bytes, listing)
    }

    pub fn load_resource(&self, name: &str) -> StratumResult<Option<Vec<u8>>> {
        self.extractor.load_resource(name)
    }

    pub fn store_resource(&self, name: &str, bytes: &[u8]) -> StratumResult<()> {
        self.extractor.store_resource(name, bytes)
    }

    pub fn remove_resource(&self, name: &str) -> StratumResult<()> {
        self.extractor.remove_resource(name)
    }

    pub fn sub_definitions(&self, name: &QualifiedName) -> StratumResult<Vec<QualifiedName>> {
        self.extractor.sub_definitions(name)
    }

    pub fn package_definitions(&self, package: &str) -> StratumResult<Vec<QualifiedName>> {
        self.extractor.package_definitions(package)
    }

    pub fn sub_packages(&self, package: &str) -> StratumResult<Vec<String>> {
        self.extractor.sub_packages(package)
    }
}

/// Memo of one invalidation pass.
struct ImpactWalk<'a> {
    changed: &'a QualifiedName,
    memo: HashMap<QualifiedName, bool>,
    visiting: HashSet<QualifiedName>,
}

impl<'a> ImpactWalk<'a> {
    fn new(changed: &'a QualifiedName) -> Self {
        Self {
            changed,
            memo: HashMap::new(),
            visiting: HashSet::new(),
        }
    }
}
