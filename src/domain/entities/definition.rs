//! Definition entity
//!
//! A definition is a named, layered entity description. In `Resolved`
//! mode it is self-contained; in `Derivation`/`Modification` mode it is a
//! delta against the base named by `super_name`. Type signatures are
//! definitions of kind [`DefinitionKind::Signature`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::domain::entities::{Behavior, Description, Interface, Property};
use crate::domain::services::composition::{
    compose_attr, compose_table, subtract_attr, subtract_table, Composable, Composition, TraitKind,
};
use crate::domain::value_objects::{DefinitionKind, Mode, QualifiedName};
use crate::error::StratumResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    name: QualifiedName,
    kind: DefinitionKind,
    mode: Mode,
    super_name: Option<QualifiedName>,
    is_interface: bool,
    is_abstract: Option<bool>,
    is_final: Option<bool>,
    description: Description,
    properties: BTreeMap<String, Property>,
    behaviors: BTreeMap<String, Behavior>,
    interfaces: BTreeMap<String, Interface>,
    children: BTreeMap<String, Definition>,
    /// Base chain this definition was resolved through, nearest first.
    /// Never persisted.
    ancestry: Vec<QualifiedName>,
}

impl Definition {
    /// An empty definition of the given kind, resolved and base-less.
    pub fn blank(name: impl Into<QualifiedName>, kind: DefinitionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            mode: Mode::Resolved,
            super_name: None,
            is_interface: false,
            is_abstract: None,
            is_final: None,
            description: Description::default(),
            properties: BTreeMap::new(),
            behaviors: BTreeMap::new(),
            interfaces: BTreeMap::new(),
            children: BTreeMap::new(),
            ancestry: Vec::new(),
        }
    }

    pub fn resolved(name: impl Into<QualifiedName>) -> Self {
        Self::blank(name, DefinitionKind::Component)
    }

    pub fn derivation(name: impl Into<QualifiedName>, base: impl Into<QualifiedName>) -> Self {
        Self::resolved(name)
            .with_mode(Mode::Derivation)
            .with_super(base)
    }

    pub fn modification(name: impl Into<QualifiedName>, base: impl Into<QualifiedName>) -> Self {
        Self::resolved(name)
            .with_mode(Mode::Modification)
            .with_super(base)
    }

    /// A resolved, base-less type signature (the bootstrap root type).
    pub fn signature(name: impl Into<QualifiedName>) -> Self {
        Self::blank(name, DefinitionKind::Signature)
    }

    pub fn signature_derivation(
        name: impl Into<QualifiedName>,
        base: impl Into<QualifiedName>,
    ) -> Self {
        Self::signature(name)
            .with_mode(Mode::Derivation)
            .with_super(base)
    }

    /// An interface type signature delta; interfaces derive from an empty
    /// synthetic base rather than a named super type.
    pub fn interface_signature(name: impl Into<QualifiedName>) -> Self {
        Self::signature(name)
            .with_mode(Mode::Derivation)
            .as_interface()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_kind(mut self, kind: DefinitionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_super(mut self, base: impl Into<QualifiedName>) -> Self {
        self.super_name = Some(base.into());
        self
    }

    pub fn as_interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = Some(is_abstract);
        self
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = Some(is_final);
        self
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.insert_property(property);
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.insert_behavior(behavior);
        self
    }

    pub fn with_interface(mut self, name: impl Into<QualifiedName>) -> Self {
        self.add_interface(name);
        self
    }

    /// Builder: contain `child` under `key` (its name becomes `this$key`).
    pub fn with_child(mut self, key: impl Into<String>, child: Definition) -> Self {
        self.insert_child(key, child);
        self
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_signature(&self) -> bool {
        self.kind == DefinitionKind::Signature
    }

    pub fn super_name(&self) -> Option<&QualifiedName> {
        self.super_name.as_ref()
    }

    /// Name of the base this definition derives from.
    ///
    /// Definitions without an explicit base derive from their enclosing
    /// name; signatures only ever have an explicit one.
    pub fn base_name(&self) -> Option<QualifiedName> {
        match (&self.super_name, self.kind) {
            (Some(base), _) => Some(base.clone()),
            (None, DefinitionKind::Component) => self.name.parent(),
            (None, DefinitionKind::Signature) => None,
        }
    }

    pub fn is_interface(&self) -> bool {
        self.is_interface
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract.unwrap_or(false)
    }

    pub fn is_final(&self) -> bool {
        self.is_final.unwrap_or(false)
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn properties(&self) -> &BTreeMap<String, Property> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn behaviors(&self) -> &BTreeMap<String, Behavior> {
        &self.behaviors
    }

    pub fn behavior(&self, signature: &str) -> Option<&Behavior> {
        self.behaviors.get(signature)
    }

    pub fn interfaces(&self) -> &BTreeMap<String, Interface> {
        &self.interfaces
    }

    pub fn implements(&self, interface: &QualifiedName) -> bool {
        self.interfaces.contains_key(interface.as_str())
    }

    /// Interfaces listed by this definition or any contained child.
    pub fn implemented_interfaces(&self) -> BTreeSet<QualifiedName> {
        let mut names: BTreeSet<QualifiedName> =
            self.interfaces.values().map(|i| i.name().clone()).collect();
        for child in self.children.values() {
            names.extend(child.implemented_interfaces());
        }
        names
    }

    pub fn children(&self) -> &BTreeMap<String, Definition> {
        &self.children
    }

    pub fn child(&self, key: &str) -> Option<&Definition> {
        self.children.get(key)
    }

    pub fn ancestry(&self) -> &[QualifiedName] {
        &self.ancestry
    }

    /// True if `name` appears anywhere in this definition's resolved base
    /// chain.
    pub fn is_derived_from(&self, name: &QualifiedName) -> bool {
        self.ancestry.contains(name)
    }

    pub fn set_description(&mut self, description: Description) {
        self.description = description;
    }

    pub fn set_abstract(&mut self, is_abstract: bool) {
        self.is_abstract = Some(is_abstract);
    }

    pub fn insert_property(&mut self, property: Property) -> Option<Property> {
        self.properties.insert(property.name().to_string(), property)
    }

    pub fn remove_property(&mut self, name: &str) -> Option<Property> {
        self.properties.remove(name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.get_mut(name)
    }

    pub fn insert_behavior(&mut self, behavior: Behavior) -> Option<Behavior> {
        self.behaviors
            .insert(behavior.signature().to_string(), behavior)
    }

    pub fn behavior_mut(&mut self, signature: &str) -> Option<&mut Behavior> {
        self.behaviors.get_mut(signature)
    }

    pub fn add_interface(&mut self, name: impl Into<QualifiedName>) {
        let interface = Interface::new(name);
        self.interfaces
            .insert(interface.name().as_str().to_string(), interface);
    }

    pub fn insert_child(&mut self, key: impl Into<String>, mut child: Definition) {
        let key = key.into();
        child.rename(self.name.nested(&key));
        self.children.insert(key, child);
    }

    /// Rename this definition, re-deriving the names of contained children.
    pub fn rename(&mut self, name: QualifiedName) {
        for (key, child) in self.children.iter_mut() {
            child.rename(name.nested(key));
        }
        self.name = name;
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub(crate) fn set_super_name(&mut self, base: Option<QualifiedName>) {
        self.super_name = base;
    }

    pub(crate) fn set_ancestry(&mut self, ancestry: Vec<QualifiedName>) {
        self.ancestry = ancestry;
    }

    pub(crate) fn properties_mut(&mut self) -> &mut BTreeMap<String, Property> {
        &mut self.properties
    }

    pub(crate) fn behaviors_mut(&mut self) -> &mut BTreeMap<String, Behavior> {
        &mut self.behaviors
    }

    pub(crate) fn interfaces_mut(&mut self) -> &mut BTreeMap<String, Interface> {
        &mut self.interfaces
    }

    pub(crate) fn children_mut(&mut self) -> &mut BTreeMap<String, Definition> {
        &mut self.children
    }

    /// Render a stable, human-readable outline of the definition.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, "");
        out
    }

    fn dump_into(&self, out: &mut String, indent: &str) {
        let _ = write!(out, "{}{} {} {}", indent, self.kind, self.mode, self.name);
        if let Some(base) = &self.super_name {
            let _ = write!(out, " extends {}", base);
        }
        if self.is_interface {
            out.push_str(" (interface)");
        }
        out.push('\n');

        let inner = format!("{}  ", indent);
        if self.is_abstract() {
            let _ = writeln!(out, "{}abstract", inner);
        }
        if self.is_final() {
            let _ = writeln!(out, "{}final", inner);
        }
        if !self.description.text().is_empty() {
            let _ = writeln!(
                out,
                "{}description: {}",
                inner,
                self.description.text().replace('\n', " / ")
            );
        }
        for property in self.properties.values() {
            let _ = write!(
                out,
                "{}property {}: {}",
                inner,
                property.name(),
                property.data_type().unwrap_or("?")
            );
            if let Some(value) = property.default_value() {
                let _ = write!(out, " = {}", value);
            }
            if property.is_sealed() {
                out.push_str(" [sealed]");
            }
            out.push('\n');
        }
        for behavior in self.behaviors.values() {
            let _ = write!(
                out,
                "{}behavior {} -> {}",
                inner,
                behavior.signature(),
                behavior.return_value().data_type().unwrap_or("void")
            );
            if behavior.is_abstract() {
                out.push_str(" [abstract]");
            }
            if behavior.is_sealed() {
                out.push_str(" [sealed]");
            }
            if !behavior.origin().is_declared() {
                let from: Vec<&str> = behavior.origin().interfaces().collect();
                let _ = write!(out, " [from {}]", from.join(", "));
            }
            out.push('\n');
        }
        for interface in self.interfaces.values() {
            let _ = writeln!(out, "{}implements {}", inner, interface.name());
        }
        for child in self.children.values() {
            child.dump_into(out, &inner);
        }
    }
}

impl Composable for Definition {
    const KIND: TraitKind = TraitKind::Definition;

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn compose(&self, delta: &Self, cx: &mut Composition<'_>) -> StratumResult<Self> {
        let properties = compose_table(&self.properties, &delta.properties, cx)?;
        let behaviors = compose_table(&self.behaviors, &delta.behaviors, cx)?;
        let interfaces = compose_table(&self.interfaces, &delta.interfaces, cx)?;
        let children = compose_table(&self.children, &delta.children, cx)?;

        // a derivation introduces a new name and base; a modification
        // customizes the definition it overlays in place
        let (name, super_name) = if delta.mode == Mode::Derivation {
            (delta.name.clone(), delta.super_name.clone())
        } else {
            (self.name.clone(), self.super_name.clone())
        };

        let mut derived = Self {
            name: QualifiedName::root(),
            kind: self.kind,
            mode: self.mode,
            super_name,
            is_interface: self.is_interface || delta.is_interface,
            is_abstract: compose_attr(&self.is_abstract, &delta.is_abstract),
            is_final: compose_attr(&self.is_final, &delta.is_final),
            description: self.description.compose(&delta.description, self.mode),
            properties,
            behaviors,
            interfaces,
            children,
            ancestry: self.ancestry.clone(),
        };
        derived.rename(name);
        Ok(derived)
    }

    fn subtract(&self, base: &Self, mode: Mode, cx: &mut Composition<'_>) -> StratumResult<Self> {
        Ok(Self {
            name: self.name.clone(),
            kind: self.kind,
            mode,
            super_name: self.super_name.clone(),
            is_interface: self.is_interface,
            is_abstract: subtract_attr(&self.is_abstract, &base.is_abstract, "abstract flag", cx)?,
            is_final: subtract_attr(&self.is_final, &base.is_final, "final flag", cx)?,
            description: self.description.subtract(&base.description),
            properties: subtract_table(&self.properties, &base.properties, mode, cx)?,
            behaviors: subtract_table(&self.behaviors, &base.behaviors, mode, cx)?,
            interfaces: subtract_table(&self.interfaces, &base.interfaces, mode, cx)?,
            children: subtract_table(&self.children, &base.children, mode, cx)?,
            ancestry: Vec::new(),
        })
    }

    fn is_discardable(&self) -> bool {
        !self.overrides_structure() && self.description.is_blank()
    }

    fn is_sealed(&self) -> bool {
        self.is_final == Some(true)
    }

    fn overrides_structure(&self) -> bool {
        self.is_abstract.is_some()
            || self.is_final.is_some()
            || !self.properties.is_empty()
            || !self.behaviors.is_empty()
            || !self.interfaces.is_empty()
            || !self.children.is_empty()
    }

    fn declaration(&self) -> Option<Self> {
        Some(Self {
            name: self.name.clone(),
            kind: self.kind,
            mode: Mode::Resolved,
            super_name: self.super_name.clone(),
            is_interface: self.is_interface,
            is_abstract: self.is_abstract,
            is_final: self.is_final,
            description: self.description.clone(),
            properties: declarations(&self.properties),
            behaviors: declarations(&self.behaviors),
            interfaces: declarations(&self.interfaces),
            children: declarations(&self.children),
            ancestry: Vec::new(),
        })
    }
}

fn declarations<T: Composable>(table: &BTreeMap<String, T>) -> BTreeMap<String, T> {
    table
        .iter()
        .filter_map(|(key, item)| item.declaration().map(|d| (key.clone(), d)))
        .collect()
}
