//! Test fixtures - reusable definition chains for tests.

use stratum::{Behavior, Definition, Description, InMemoryRepository, Property, QualifiedName};

pub fn name(s: &str) -> QualifiedName {
    QualifiedName::new(s)
}

/// `Base` (resolved) <- `Base.Child` <- `Base.Child.Grandchild`, plus an
/// unrelated `Base.Sibling`.
pub fn chain_repository() -> InMemoryRepository {
    InMemoryRepository::new()
        .with_definition(
            Definition::resolved("Base")
                .with_description(Description::new("The base."))
                .with_property(Property::new("Color", "String").with_default("red"))
                .with_behavior(Behavior::new("paint()").returning("void")),
        )
        .with_definition(
            Definition::derivation("Base.Child", "Base")
                .with_property(Property::new("Size", "int").with_default("1")),
        )
        .with_definition(
            Definition::derivation("Base.Child.Grandchild", "Base.Child")
                .with_property(Property::overlay("Color").with_default("blue")),
        )
        .with_definition(Definition::derivation("Base.Sibling", "Base"))
}

/// `Object` (bootstrap) <- `Widget` <- `Button`, the `Clickable` interface
/// and `Link` implementing it.
pub fn signature_repository() -> InMemoryRepository {
    InMemoryRepository::new()
        .with_signature(
            Definition::signature("Object").with_behavior(Behavior::new("hash()").returning("int")),
        )
        .with_signature(
            Definition::signature_derivation("Widget", "Object")
                .with_property(Property::new("Width", "int")),
        )
        .with_signature(Definition::signature_derivation("Button", "Widget"))
        .with_signature(
            Definition::interface_signature("Clickable")
                .with_behavior(Behavior::new("click()").abstract_behavior()),
        )
        .with_signature(
            Definition::signature_derivation("Link", "Object").with_interface("Clickable"),
        )
}
