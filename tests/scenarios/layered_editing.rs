//! Scenario: Editing a Layered Definition
//!
//! Journey: A tool opens a definition three levels deep, changes it, saves
//! it, then changes its parent.
//!
//! Steps:
//! 1. Load `Base.Child.Grandchild` through the cache
//! 2. Change an inherited default and save
//! 3. Check that only the differences were written
//! 4. Re-save the parent with a new property
//! 5. Reload the grandchild and see the parent's change
//!
//! Success Criteria:
//! - Every level contributes to the resolved view
//! - Saving never copies inherited state into the repository
//! - Sibling definitions stay cached when they are unaffected

use std::sync::Arc;

use crate::common::*;
use stratum::{CacheEngine, Mode, Property, Repository};

/// SCENARIO: edit a grandchild, then its parent
#[test]
fn scenario_edit_grandchild_then_parent() {
    let repo = Arc::new(CountingRepository::new(chain_repository()));
    let cache = CacheEngine::new(repo.clone());
    let mut diagnostics = cache.new_diagnostics();

    // Step 1: every level shows up in the resolved view
    let grandchild = cache
        .load_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
        .unwrap()
        .unwrap();
    assert_eq!(grandchild.mode(), Mode::Resolved);
    assert_eq!(grandchild.description().text(), "The base.");
    assert_eq!(grandchild.property("Color").unwrap().default_value(), Some("blue"));
    assert_eq!(grandchild.property("Size").unwrap().default_value(), Some("1"));
    assert!(grandchild.behavior("paint()").is_some());
    assert_eq!(
        grandchild.ancestry(),
        &[name("Base.Child"), name("Base")][..]
    );

    // Step 2: change the inherited size and save
    let mut edited = cache
        .load_definition_mut(&name("Base.Child.Grandchild"), &mut diagnostics)
        .unwrap()
        .unwrap();
    edited
        .property_mut("Size")
        .unwrap()
        .set_default_value(Some("3".to_string()));
    cache.store(&edited, &mut diagnostics).unwrap();

    // Step 3: the stored delta holds only what differs from Base.Child
    let stored = repo
        .inner()
        .load_definition(&name("Base.Child.Grandchild"))
        .unwrap()
        .unwrap();
    assert_eq!(stored.mode(), Mode::Derivation);
    let keys: Vec<&String> = stored.properties().keys().collect();
    assert_eq!(keys, ["Color", "Size"]);
    assert!(stored.behaviors().is_empty());
    assert!(stored.description().is_blank());

    // Step 4: the sibling is cached, then the parent changes
    cache
        .load_definition(&name("Base.Sibling"), &mut diagnostics)
        .unwrap();
    let mut child = cache
        .load_definition_mut(&name("Base.Child"), &mut diagnostics)
        .unwrap()
        .unwrap();
    child.insert_property(Property::new("Depth", "int").with_default("0"));
    cache.store(&child, &mut diagnostics).unwrap();

    assert!(cache.contains_definition(&name("Base.Sibling")));
    assert!(!cache.contains_definition(&name("Base.Child")));
    assert!(!cache.contains_definition(&name("Base.Child.Grandchild")));

    // Step 5: the grandchild picks up the parent's property and keeps its own edit
    let reloaded = cache
        .load_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.property("Depth").unwrap().default_value(), Some("0"));
    assert_eq!(reloaded.property("Size").unwrap().default_value(), Some("3"));
    assert_eq!(reloaded.property("Color").unwrap().default_value(), Some("blue"));
    assert!(!diagnostics.has_conflicts());
}

/// SCENARIO: a definition is deleted while its descendants are cached
#[test]
fn scenario_remove_parent_breaks_descendants() {
    let repo = Arc::new(chain_repository());
    let cache = CacheEngine::new(repo);
    let mut diagnostics = cache.new_diagnostics();

    cache
        .load_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
        .unwrap();
    cache.remove(&name("Base.Child")).unwrap();

    assert!(cache
        .load_definition(&name("Base.Child"), &mut diagnostics)
        .unwrap()
        .is_none());
    let err = cache
        .load_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
        .unwrap_err();
    assert!(matches!(
        err,
        stratum::DefinitionError::UnresolvableBase { .. }
    ));
}
