//! Property tests for composition and resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;

use stratum::{
    compose_delta, resolve, Definition, Description, Diagnostics, InMemoryRepository, Mode,
    Property, QualifiedName, Resolver,
};

use crate::strategies::*;

fn derivation(overlays: &BTreeMap<String, String>, added: &Table, text: &str) -> Definition {
    let delta = overlays.iter().fold(
        Definition::derivation("Base.Child", "Base").with_description(Description::new(text)),
        |def, (key, value)| {
            def.with_property(Property::overlay(key.as_str()).with_default(value.as_str()))
        },
    );
    declare(delta, added, "U")
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: folding a modification into a derivation first gives the
    /// same result as applying both to the resolved base in turn.
    #[test]
    fn property_modification_folds_associatively(
        base_properties in table("p"),
        overlays in overrides("p"),
        added in table("n"),
        modified in overrides("n"),
        declared in table("m"),
        base_text in text(),
        derived_text in text(),
        modified_text in text(),
    ) {
        let base = resolved_base(&base_properties, &base_text, None);
        // overlays of missing base properties would be dropped either way
        let overlays: BTreeMap<String, String> = overlays
            .into_iter()
            .filter(|(key, _)| base_properties.contains_key(key))
            .collect();
        let derived = derivation(&overlays, &added, &derived_text);

        let modification = modified
            .iter()
            .filter(|(key, _)| added.contains_key(*key))
            .fold(
                Definition::modification("Base.Child", "Base")
                    .with_description(Description::new(modified_text.as_str())),
                |def, (key, value)| {
                    def.with_property(
                        Property::overlay(key.as_str())
                            .with_mode(Mode::Modification)
                            .with_default(value.as_str()),
                    )
                },
            );
        let modification = declare(modification, &declared, "V");

        let mut diagnostics = Diagnostics::new();
        let left = compose_delta(
            &compose_delta(&base, &derived, &mut diagnostics).unwrap(),
            &modification,
            &mut diagnostics,
        )
        .unwrap();
        let folded = compose_delta(&derived, &modification, &mut diagnostics).unwrap();
        prop_assert_eq!(folded.mode(), Mode::Derivation);
        let right = compose_delta(&base, &folded, &mut diagnostics).unwrap();

        prop_assert_eq!(left, right);
        prop_assert!(!diagnostics.has_conflicts(), "unexpected conflicts: {diagnostics:?}");
    }

    /// PROPERTY: resolving the same stored chain twice yields identical
    /// definitions and identical diagnostics.
    #[test]
    fn property_resolution_is_deterministic(
        base_properties in table("p"),
        overlays in overrides("p"),
        added in table("n"),
        base_text in text(),
        derived_text in text(),
    ) {
        // overlays of missing properties are kept so diagnostics get exercised
        let repo = InMemoryRepository::new()
            .with_definition(resolved_base(&base_properties, &base_text, None))
            .with_definition(derivation(&overlays, &added, &derived_text));
        let child = QualifiedName::new("Base.Child");

        let mut first_diagnostics = Diagnostics::new();
        let first = resolve(&repo, &child, &mut first_diagnostics).unwrap();

        let resolver = Resolver::new(Arc::new(repo));
        let mut second_diagnostics = Diagnostics::new();
        let second = resolver.resolve_definition(&child, &mut second_diagnostics).unwrap();

        prop_assert!(first.is_some());
        prop_assert_eq!(first, second);
        prop_assert_eq!(first_diagnostics, second_diagnostics);
    }
}
