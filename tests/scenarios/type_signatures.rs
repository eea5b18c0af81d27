//! Scenario: Evolving an Interface
//!
//! Journey: A type hierarchy and a component both depend on the
//! `Clickable` interface. The interface gains a behavior.
//!
//! Steps:
//! 1. Load the implementing type and component through the cache
//! 2. Add a behavior to `Clickable` and save it
//! 3. Reload and see the new behavior expanded into both
//!
//! Success Criteria:
//! - Interface behaviors are expanded on load
//! - Changing an interface evicts every cached implementor, including
//!   those that reach it through another interface
//! - Unrelated types stay cached

use std::sync::Arc;

use crate::common::*;
use stratum::{Behavior, CacheEngine, Definition, DefinitionError};

fn repository() -> stratum::InMemoryRepository {
    signature_repository()
        .with_definition(Definition::resolved("Base"))
        .with_definition(Definition::derivation("Base.Button", "Base").with_interface("Clickable"))
        .with_signature(Definition::interface_signature("Pressable").with_interface("Clickable"))
        .with_definition(Definition::derivation("Base.Key", "Base").with_interface("Pressable"))
        .with_signature(Definition::signature_derivation("Orphan", "Ghost"))
}

/// SCENARIO: an interface gains a behavior
#[test]
fn scenario_interface_change_reaches_implementors() {
    let cache = CacheEngine::new(Arc::new(repository()));
    let mut diagnostics = cache.new_diagnostics();

    // Step 1: both implementors expand the interface
    let link = cache.load_type_signature(&name("Link")).unwrap().unwrap();
    assert!(link.behavior("click()").unwrap().origin().is_from_interface("Clickable"));
    assert!(link.behavior("hash()").is_some());

    let button = cache
        .load_definition(&name("Base.Button"), &mut diagnostics)
        .unwrap()
        .unwrap();
    assert!(button.behavior("click()").is_some());

    let widget = cache.load_type_signature(&name("Button")).unwrap().unwrap();
    assert_eq!(widget.ancestry(), &[name("Widget"), name("Object")][..]);

    // Step 2: Clickable gains release()
    let shared = cache.load_type_signature(&name("Clickable")).unwrap().unwrap();
    let mut clickable = Definition::clone(&shared);
    clickable.insert_behavior(Behavior::new("release()").abstract_behavior());
    cache.store(&clickable, &mut diagnostics).unwrap();

    assert!(!cache.contains_type_signature(&name("Link")));
    assert!(!cache.contains_definition(&name("Base.Button")));
    assert!(cache.contains_type_signature(&name("Button")));

    // Step 3: reloads pick up the new behavior
    let link = cache.load_type_signature(&name("Link")).unwrap().unwrap();
    assert!(link.behavior("release()").unwrap().origin().is_from_interface("Clickable"));
    let button = cache
        .load_definition(&name("Base.Button"), &mut diagnostics)
        .unwrap()
        .unwrap();
    assert!(button.behavior("release()").is_some());
}

/// SCENARIO: an interface two levels up gains a behavior
#[test]
fn scenario_super_interface_change_reaches_indirect_implementors() {
    let cache = CacheEngine::new(Arc::new(repository()));
    let mut diagnostics = cache.new_diagnostics();

    // Step 1: Base.Key implements Pressable, which extends Clickable
    let key = cache
        .load_definition(&name("Base.Key"), &mut diagnostics)
        .unwrap()
        .unwrap();
    assert!(key.behavior("click()").unwrap().origin().is_from_interface("Pressable"));

    // Step 2: only Clickable changes
    let shared = cache.load_type_signature(&name("Clickable")).unwrap().unwrap();
    let mut clickable = Definition::clone(&shared);
    clickable.insert_behavior(Behavior::new("release()").abstract_behavior());
    cache.store(&clickable, &mut diagnostics).unwrap();

    // Step 3: the cached Base.Key was built from the old Clickable
    assert!(!cache.contains_definition(&name("Base.Key")));
    let key = cache
        .load_definition(&name("Base.Key"), &mut diagnostics)
        .unwrap()
        .unwrap();
    assert!(key.behavior("release()").is_some());
}

/// SCENARIO: a type whose base was never stored
#[test]
fn scenario_type_with_missing_base_is_not_cached() {
    let cache = CacheEngine::new(Arc::new(repository()));

    let err = cache.load_type_signature(&name("Orphan")).unwrap_err();
    match err {
        DefinitionError::UnresolvableBase { name: n, base } => {
            assert_eq!(n, name("Orphan"));
            assert_eq!(base, name("Ghost"));
        }
        other => panic!("expected UnresolvableBase, got {other:?}"),
    }
    assert!(!cache.contains_type_signature(&name("Orphan")));
}
