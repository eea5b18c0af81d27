//! Cache contracts
//!
//! A cached read is stable until something it depends on is stored or
//! removed through the same engine, and a load that raced with such a
//! store never poisons the cache.

use std::sync::Arc;

use crate::common::*;
use stratum::{CacheEngine, DefinitionError, Property};

fn engine() -> (Arc<CountingRepository>, Arc<CacheEngine>) {
    let repo = Arc::new(CountingRepository::new(chain_repository()));
    let cache = Arc::new(CacheEngine::new(repo.clone()));
    (repo, cache)
}

/// Repeated reads hit the cache, found or not.
mod memoization {
    use super::*;

    #[test]
    fn contract_hits_do_not_touch_the_repository() {
        let (repo, cache) = engine();
        let mut diagnostics = cache.new_diagnostics();

        let first = cache
            .load_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
            .unwrap()
            .unwrap();
        let loads = repo.definition_loads();
        assert_eq!(loads, 3);

        let second = cache
            .load_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(repo.definition_loads(), loads);
    }

    #[test]
    fn contract_absent_names_are_cached_too() {
        let (repo, cache) = engine();
        let mut diagnostics = cache.new_diagnostics();

        assert!(cache
            .load_definition(&name("Nowhere"), &mut diagnostics)
            .unwrap()
            .is_none());
        assert!(cache
            .load_definition(&name("Nowhere"), &mut diagnostics)
            .unwrap()
            .is_none());
        assert_eq!(repo.definition_loads(), 1);
        assert!(cache.contains_definition(&name("Nowhere")));
    }

    #[test]
    fn contract_mutable_copies_never_alias_the_cache() {
        let (_repo, cache) = engine();
        let mut diagnostics = cache.new_diagnostics();

        let mut copy = cache
            .load_definition_mut(&name("Base.Child"), &mut diagnostics)
            .unwrap()
            .unwrap();
        copy.insert_property(Property::new("Scratch", "int"));

        let shared = cache
            .load_definition(&name("Base.Child"), &mut diagnostics)
            .unwrap()
            .unwrap();
        assert!(shared.property("Scratch").is_none());
    }
}

/// Failures are reported, never cached.
mod failures {
    use super::*;

    #[test]
    fn contract_repository_failure_propagates_uncached() {
        let (repo, cache) = engine();
        repo.fail_loads_of(&name("Base.Child"));
        let mut diagnostics = cache.new_diagnostics();

        let err = cache
            .load_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Repository(_)));
        assert!(!cache.contains_definition(&name("Base.Child.Grandchild")));
    }
}

/// Stores are visible to every later read.
mod freshness {
    use super::*;

    #[test]
    fn contract_store_evicts_dependents() {
        let (_repo, cache) = engine();
        let mut diagnostics = cache.new_diagnostics();

        cache
            .load_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
            .unwrap();
        let mut child = cache
            .load_definition_mut(&name("Base.Child"), &mut diagnostics)
            .unwrap()
            .unwrap();
        child.insert_property(Property::new("Depth", "int"));
        cache.store(&child, &mut diagnostics).unwrap();

        assert!(!cache.contains_definition(&name("Base.Child.Grandchild")));
        let grandchild = cache
            .load_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
            .unwrap()
            .unwrap();
        assert!(grandchild.property("Depth").is_some());
    }

    #[test]
    fn contract_load_racing_a_store_is_not_cached() {
        let (repo, cache) = engine();

        // While the grandchild resolves, its parent is re-stored with a
        // new property after the resolver has already read the old one.
        let writer = Arc::clone(&cache);
        repo.after_next_load_of(&name("Base.Child"), move || {
            let mut diagnostics = writer.new_diagnostics();
            let mut child = writer
                .extractor()
                .load_definition(&name("Base.Child"), &mut diagnostics)
                .unwrap()
                .unwrap();
            child.insert_property(Property::new("Depth", "int"));
            writer.store(&child, &mut diagnostics).unwrap();
        });

        let mut diagnostics = cache.new_diagnostics();
        let stale = cache
            .load_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
            .unwrap()
            .unwrap();
        assert!(stale.property("Depth").is_none());
        assert!(!cache.contains_definition(&name("Base.Child.Grandchild")));

        let fresh = cache
            .load_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
            .unwrap()
            .unwrap();
        assert!(fresh.property("Depth").is_some());
    }
}
