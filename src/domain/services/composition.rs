//! Composition service
//!
//! Every composable sub-trait of a definition (properties, behaviors,
//! parameters, return values, interfaces, contained child definitions) is
//! merged by the same base + delta rule and split back by the inverse
//! subtraction rule. The element types implement [`Composable`]; the table
//! helpers here apply the rule to keyed collections of them.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::domain::entities::Definition;
use crate::domain::value_objects::{Diagnostic, DiagnosticKind, Diagnostics, Mode, Severity};
use crate::error::{DefinitionError, StratumResult};

/// Closed set of composable element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraitKind {
    Definition,
    Property,
    Behavior,
    ReturnValue,
    Parameter,
    Interface,
}

impl TraitKind {
    pub fn label(&self) -> &'static str {
        match self {
            TraitKind::Definition => "child",
            TraitKind::Property => "property",
            TraitKind::Behavior => "behavior",
            TraitKind::ReturnValue => "return",
            TraitKind::Parameter => "param",
            TraitKind::Interface => "interface",
        }
    }

    /// Path segment used in diagnostics (`property:Color`).
    pub fn segment(&self, key: &str) -> String {
        format!("{}:{}", self.label(), key)
    }
}

/// Capability contract shared by every composable element.
pub trait Composable: Clone {
    const KIND: TraitKind;

    fn mode(&self) -> Mode;

    fn set_mode(&mut self, mode: Mode);

    /// Apply `delta` on top of `self` (the base). The result carries the
    /// base's mode.
    fn compose(&self, delta: &Self, cx: &mut Composition<'_>) -> StratumResult<Self>;

    /// Minimal delta (in `mode`) such that composing it onto `base`
    /// reproduces `self`.
    fn subtract(&self, base: &Self, mode: Mode, cx: &mut Composition<'_>) -> StratumResult<Self>;

    /// True for a delta that carries no information.
    fn is_discardable(&self) -> bool;

    fn is_sealed(&self) -> bool {
        false
    }

    /// True if the delta changes more than documentation.
    fn overrides_structure(&self) -> bool {
        !self.is_discardable()
    }

    /// Persistable form of an element declared at this level, or `None`
    /// if the element is regenerated on resolve and need not be stored.
    fn declaration(&self) -> Option<Self> {
        let mut declared = self.clone();
        declared.set_mode(Mode::Resolved);
        Some(declared)
    }
}

/// Per-call composition context: diagnostics sink, reserved names and the
/// path of the element currently being processed.
pub struct Composition<'a> {
    diagnostics: &'a mut Diagnostics,
    reserved_names: &'a [String],
    path: Vec<String>,
    extracting: bool,
}

impl<'a> Composition<'a> {
    pub fn new(root: impl Into<String>, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            diagnostics,
            reserved_names: &[],
            path: vec![root.into()],
            extracting: false,
        }
    }

    /// Context for splitting a resolved definition into a stored delta.
    /// Inherited values the derived side no longer carries are reported.
    pub fn for_extraction(mut self) -> Self {
        self.extracting = true;
        self
    }

    pub fn with_reserved_names(mut self, reserved_names: &'a [String]) -> Self {
        self.reserved_names = reserved_names;
        self
    }

    pub fn path(&self) -> String {
        self.path.join("/")
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.iter().any(|r| r == name)
    }

    /// Run `f` with `segment` pushed onto the diagnostic path.
    pub fn scoped<T>(
        &mut self,
        segment: String,
        f: impl FnOnce(&mut Self) -> StratumResult<T>,
    ) -> StratumResult<T> {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) -> StratumResult<()> {
        self.report(kind, Severity::Warning, message)
    }

    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> StratumResult<()> {
        let path = self.path();
        self.diagnostics
            .push(Diagnostic::new(kind, severity, message, path))
    }
}

/// Compose one element, salvaging a delta whose mode cannot apply to the
/// base by first subtracting the base from it.
pub fn compose_item<T: Composable>(
    base: &T,
    delta: &T,
    cx: &mut Composition<'_>,
) -> StratumResult<T> {
    let delta = if delta.mode().applies_to(base.mode()) {
        Cow::Borrowed(delta)
    } else {
        cx.warn(
            DiagnosticKind::NameCollision,
            format!(
                "{} delta collides with an existing {} {}; keeping only its differences",
                delta.mode(),
                base.mode(),
                T::KIND.label()
            ),
        )?;
        let mode = if base.mode().is_resolved() {
            Mode::Derivation
        } else {
            Mode::Modification
        };
        Cow::Owned(delta.subtract(base, mode, cx)?)
    };

    if base.is_sealed() && delta.overrides_structure() {
        cx.warn(
            DiagnosticKind::SealedOverride,
            format!("sealed {} cannot be overridden", T::KIND.label()),
        )?;
        return Ok(base.clone());
    }

    base.compose(&delta, cx)
}

/// Compose a keyed table of elements.
///
/// - inherited elements without a delta are kept as-is
/// - overlays of missing base elements are dropped (orphaned)
/// - new declarations using reserved names are dropped
pub fn compose_table<T: Composable>(
    base: &BTreeMap<String, T>,
    delta: &BTreeMap<String, T>,
    cx: &mut Composition<'_>,
) -> StratumResult<BTreeMap<String, T>> {
    let mut result = BTreeMap::new();

    for (key, base_item) in base {
        let composed = match delta.get(key) {
            Some(delta_item) => {
                cx.scoped(T::KIND.segment(key), |cx| compose_item(base_item, delta_item, cx))?
            }
            None => base_item.clone(),
        };
        result.insert(key.clone(), composed);
    }

    for (key, delta_item) in delta {
        if base.contains_key(key) {
            continue;
        }
        let keep = cx.scoped(T::KIND.segment(key), |cx| {
            if delta_item.mode().is_delta() {
                cx.warn(
                    DiagnosticKind::Orphaned,
                    format!("{} overlay has no base element", T::KIND.label()),
                )?;
                return Ok(false);
            }
            if cx.is_reserved(key) {
                cx.warn(
                    DiagnosticKind::ReservedName,
                    format!("'{}' is a reserved {} name", key, T::KIND.label()),
                )?;
                return Ok(false);
            }
            Ok(true)
        })?;
        if keep {
            result.insert(key.clone(), delta_item.clone());
        }
    }

    Ok(result)
}

/// Subtract `base` from `derived`, producing overlay elements in `mode`
/// and declarations for elements new at this level.
pub fn subtract_table<T: Composable>(
    derived: &BTreeMap<String, T>,
    base: &BTreeMap<String, T>,
    mode: Mode,
    cx: &mut Composition<'_>,
) -> StratumResult<BTreeMap<String, T>> {
    let mut result = BTreeMap::new();

    for (key, item) in derived {
        match base.get(key) {
            Some(base_item) => {
                let delta =
                    cx.scoped(T::KIND.segment(key), |cx| item.subtract(base_item, mode, cx))?;
                if !delta.is_discardable() {
                    result.insert(key.clone(), delta);
                }
            }
            None => {
                if let Some(declared) = item.declaration() {
                    result.insert(key.clone(), declared);
                }
            }
        }
    }

    for key in base.keys() {
        if !derived.contains_key(key) {
            cx.scoped(T::KIND.segment(key), |cx| {
                cx.warn(
                    DiagnosticKind::Discarded,
                    format!(
                        "inherited {} is missing and cannot be removed by a delta",
                        T::KIND.label()
                    ),
                )
            })?;
        }
    }

    Ok(result)
}

/// Inherit `delta` unless it carries a value.
pub(crate) fn compose_attr<T: Clone>(base: &Option<T>, delta: &Option<T>) -> Option<T> {
    delta.clone().or_else(|| base.clone())
}

/// Keep `derived` only where it differs from `base`.
///
/// An absent delta value means "inherit", so a value cleared on the
/// derived side cannot be stored; extraction reports it as discarded.
pub(crate) fn subtract_attr<T: Clone + PartialEq>(
    derived: &Option<T>,
    base: &Option<T>,
    attribute: &str,
    cx: &mut Composition<'_>,
) -> StratumResult<Option<T>> {
    if derived == base {
        return Ok(None);
    }
    if derived.is_none() && cx.extracting {
        cx.warn(
            DiagnosticKind::Discarded,
            format!("cleared {} cannot be expressed by a delta; the inherited value is kept", attribute),
        )?;
    }
    Ok(derived.clone())
}

/// Compose any legal pair of definitions.
///
/// `R + D -> R`, `R + M -> R`, `D + M -> D`, `M + M -> M`. Used directly to
/// fold a modification into a derivation; the resolver calls it for
/// each level of a base chain.
pub fn compose_delta(
    base: &Definition,
    delta: &Definition,
    diagnostics: &mut Diagnostics,
) -> StratumResult<Definition> {
    if !delta.mode().applies_to(base.mode()) {
        return Err(DefinitionError::InvalidMode {
            name: delta.name().clone(),
            mode: delta.mode(),
            operation: "composition",
        });
    }
    let mut cx = Composition::new(delta.name().as_str(), diagnostics);
    base.compose(delta, &mut cx)
}

/// Extract the derivation that turns resolved `base` into resolved `derived`.
pub fn extract_definition(
    derived: &Definition,
    base: &Definition,
    diagnostics: &mut Diagnostics,
) -> StratumResult<Definition> {
    for def in [derived, base] {
        if !def.mode().is_resolved() {
            return Err(DefinitionError::InvalidMode {
                name: def.name().clone(),
                mode: def.mode(),
                operation: "extraction",
            });
        }
    }
    let mut cx = Composition::new(derived.name().as_str(), diagnostics).for_extraction();
    derived.subtract(base, Mode::Derivation, &mut cx)
}
