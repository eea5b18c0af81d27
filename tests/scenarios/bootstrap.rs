//! Scenario: Bootstrapping an Empty Repository
//!
//! Journey: A fresh repository gets its root definition, then a first
//! top-level definition derived implicitly from the root.
//!
//! Steps:
//! 1. Store the root definition (empty name)
//! 2. Store a resolved top-level definition that repeats the root's state
//! 3. Load it back
//!
//! Success Criteria:
//! - The root is stored exactly as given
//! - Top-level definitions are stored as deltas against the root

use std::sync::Arc;

use crate::common::*;
use stratum::{
    CacheEngine, Definition, DefinitionError, Description, InMemoryRepository, Mode, Property,
    QualifiedName, Repository,
};

fn root() -> Definition {
    Definition::resolved(QualifiedName::root())
        .with_description(Description::new("Root of all definitions."))
        .with_property(Property::new("Id", "long"))
}

/// SCENARIO: root first, then a top-level definition
#[test]
fn scenario_bootstrap_root_then_top_level() {
    let repo = Arc::new(InMemoryRepository::new());
    let cache = CacheEngine::new(repo.clone());
    let mut diagnostics = cache.new_diagnostics();

    // Step 1: the root is stored unchanged
    cache.store(&root(), &mut diagnostics).unwrap();
    let stored_root = repo.load_definition(&QualifiedName::root()).unwrap().unwrap();
    assert_eq!(stored_root, root());

    // Step 2: a top-level definition only persists its additions
    let widget = Definition::resolved("Widget")
        .with_description(Description::new("Root of all definitions.\nA widget."))
        .with_property(Property::new("Id", "long"))
        .with_property(Property::new("Label", "String"));
    cache.store(&widget, &mut diagnostics).unwrap();

    let stored = repo.load_definition(&name("Widget")).unwrap().unwrap();
    assert_eq!(stored.mode(), Mode::Derivation);
    assert!(stored.property("Id").is_none());
    assert!(stored.property("Label").is_some());
    assert_eq!(stored.description().text(), "A widget.");

    // Step 3: loading composes it back on top of the root
    let loaded = cache
        .load_definition(&name("Widget"), &mut diagnostics)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.ancestry(), &[QualifiedName::root()][..]);
    assert_eq!(loaded.properties(), widget.properties());
    assert_eq!(loaded.description(), widget.description());
}

/// SCENARIO: a top-level definition saved before any root exists
#[test]
fn scenario_top_level_without_root_is_rejected() {
    let cache = CacheEngine::new(Arc::new(InMemoryRepository::new()));
    let mut diagnostics = cache.new_diagnostics();

    let err = cache
        .store(&Definition::resolved("Widget"), &mut diagnostics)
        .unwrap_err();
    assert!(matches!(err, DefinitionError::MissingBase { .. }));
}
