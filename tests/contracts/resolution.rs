//! Resolution contracts
//!
//! The resolver never hands out an unresolved delta, aborts on anything
//! that precludes composition, and otherwise recovers locally.

use std::sync::Arc;

use crate::common::*;
use stratum::{
    Definition, DefinitionError, DiagnosticKind, Diagnostics, Mode, Property, Resolver,
};

/// Every definition the resolver returns is in resolved mode, down to its
/// sub-traits and contained children.
mod always_resolved {
    use super::*;

    #[test]
    fn contract_resolved_output_has_no_delta_elements() {
        let repo = chain_repository().with_definition(
            Definition::derivation("Base.Panel", "Base").with_child(
                "Header",
                Definition::resolved("Header").with_property(Property::new("Text", "String")),
            ),
        );
        let resolver = Resolver::new(Arc::new(repo));
        let mut diagnostics = Diagnostics::new();

        for n in ["Base", "Base.Child", "Base.Child.Grandchild", "Base.Panel"] {
            let def = resolver
                .resolve_definition(&name(n), &mut diagnostics)
                .unwrap()
                .unwrap();
            assert_fully_resolved(&def);
        }
    }

    fn assert_fully_resolved(def: &Definition) {
        use stratum::Composable;

        assert_eq!(def.mode(), Mode::Resolved, "{}", def.name());
        assert!(def.properties().values().all(|p| p.mode() == Mode::Resolved));
        assert!(def.behaviors().values().all(|b| b.mode() == Mode::Resolved));
        assert!(def.interfaces().values().all(|i| i.mode() == Mode::Resolved));
        for child in def.children().values() {
            assert_fully_resolved(child);
        }
    }
}

/// Missing bases and wrong modes abort immediately.
mod fatal_errors {
    use super::*;

    #[test]
    fn contract_missing_base_aborts() {
        let repo = chain_repository().with_definition(Definition::derivation("Lost.Leaf", "Lost"));
        let mut diagnostics = Diagnostics::new();

        let err = Resolver::new(Arc::new(repo))
            .resolve_definition(&name("Lost.Leaf"), &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnresolvableBase { .. }));
    }

    #[test]
    fn contract_invalid_mode_aborts() {
        let repo = chain_repository()
            .with_definition(Definition::resolved("Base.Bad").with_mode(Mode::Invalid));
        let mut diagnostics = Diagnostics::new();

        let err = Resolver::new(Arc::new(repo))
            .resolve_definition(&name("Base.Bad"), &mut diagnostics)
            .unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::InvalidMode {
                mode: Mode::Invalid,
                ..
            }
        ));
    }

    #[test]
    fn contract_repository_failures_propagate() {
        let repo = Arc::new(CountingRepository::new(chain_repository()));
        repo.fail_loads_of(&name("Base"));
        let mut diagnostics = Diagnostics::new();

        let err = Resolver::new(repo)
            .resolve_definition(&name("Base.Child"), &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Repository(_)));
    }
}

/// Structural conflicts are recovered locally: the offending element is
/// dropped and a diagnostic recorded, the rest still resolves.
mod local_recovery {
    use super::*;

    #[test]
    fn contract_conflicts_yield_best_effort_result() {
        let repo = chain_repository().with_definition(
            Definition::derivation("Base.Messy", "Base")
                .with_property(Property::overlay("Missing").with_default("1"))
                .with_property(Property::new("Color", "String").with_default("green"))
                .with_property(Property::new("Fresh", "bool")),
        );
        let mut diagnostics = Diagnostics::new();

        let messy = Resolver::new(Arc::new(repo))
            .resolve_definition(&name("Base.Messy"), &mut diagnostics)
            .unwrap()
            .unwrap();

        assert!(messy.property("Missing").is_none());
        assert_eq!(messy.property("Color").unwrap().default_value(), Some("green"));
        assert!(messy.property("Fresh").is_some());
        assert_eq!(diagnostics.count_of(DiagnosticKind::Orphaned), 1);
        assert_eq!(diagnostics.count_of(DiagnosticKind::NameCollision), 1);
        assert!(diagnostics.has_conflicts());
    }

    #[test]
    fn contract_resolution_is_deterministic() {
        let resolver = Resolver::new(Arc::new(chain_repository()));
        let mut diagnostics = Diagnostics::new();

        let first = resolver
            .resolve_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
            .unwrap();
        let second = resolver
            .resolve_definition(&name("Base.Child.Grandchild"), &mut diagnostics)
            .unwrap();
        assert_eq!(first, second);
    }
}
