//! Property tests for store/load symmetry.

use proptest::prelude::*;

use stratum::{compose_delta, extract_definition, Definition, Description, Diagnostics, Property};

use crate::strategies::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: composing the extracted delta onto the base reproduces the
    /// derived definition.
    #[test]
    fn property_extract_inverts_compose(
        base_properties in table("p"),
        changed_defaults in overrides("p"),
        added in table("n"),
        base_text in text(),
        edit in description_edit(),
        extra in "[a-z]{1,6}",
        base_abstract in proptest::option::of(any::<bool>()),
        derived_abstract in proptest::option::of(any::<bool>()),
    ) {
        let base = resolved_base(&base_properties, &base_text, base_abstract);

        let mut derived = Definition::resolved("Base.Child")
            .with_super("Base")
            .with_description(Description::new(edit_description(&base_text, edit, &extra)));
        for (key, default) in &base_properties {
            let default = changed_defaults.get(key).cloned().or_else(|| default.clone());
            let property = Property::new(key.as_str(), "T");
            derived.insert_property(match default {
                Some(value) => property.with_default(value),
                None => property,
            });
        }
        derived = declare(derived, &added, "U");
        if let Some(flag) = derived_abstract.or(base_abstract) {
            derived = derived.with_abstract(flag);
        }

        let mut diagnostics = Diagnostics::new();
        let delta = extract_definition(&derived, &base, &mut diagnostics).unwrap();
        let composed = compose_delta(&base, &delta, &mut diagnostics).unwrap();

        prop_assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        prop_assert_eq!(composed.name(), derived.name());
        prop_assert_eq!(composed.properties(), derived.properties());
        prop_assert_eq!(composed.description(), derived.description());
        prop_assert_eq!(composed.is_abstract(), derived.is_abstract());
    }

    /// PROPERTY: unchanged inherited state never reaches the stored delta.
    #[test]
    fn property_extract_omits_inherited_state(
        base_properties in table("p"),
        base_text in text(),
    ) {
        let base = resolved_base(&base_properties, &base_text, None);
        let mut derived = base.clone();
        derived.rename("Base.Child".into());

        let mut diagnostics = Diagnostics::new();
        let delta = extract_definition(&derived, &base, &mut diagnostics).unwrap();

        prop_assert!(delta.properties().is_empty());
        prop_assert!(delta.description().is_blank());
    }
}
