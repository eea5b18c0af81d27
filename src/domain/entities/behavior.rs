//! Behavior sub-trait, with its return value and parameters
//!
//! Behaviors are keyed by signature (`paint(Graphics)`). The signature of
//! an inherited behavior never changes; deltas may only adjust its flags,
//! implementation, documentation and per-parameter details.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::entities::Description;
use crate::domain::services::composition::{
    compose_attr, subtract_attr, Composable, Composition, TraitKind,
};
use crate::domain::value_objects::{DiagnosticKind, Mode};
use crate::error::StratumResult;

/// Parameter passing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    In,
    Out,
    InOut,
}

/// Where a behavior came from.
///
/// A behavior is either declared somewhere along the base chain, or was
/// expanded from one or more implemented interfaces during resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    declared: bool,
    interfaces: BTreeSet<String>,
}

impl Default for Origin {
    fn default() -> Self {
        Self {
            declared: true,
            interfaces: BTreeSet::new(),
        }
    }
}

impl Origin {
    pub fn from_interface(interface: impl Into<String>) -> Self {
        Self {
            declared: false,
            interfaces: BTreeSet::from([interface.into()]),
        }
    }

    pub fn is_declared(&self) -> bool {
        self.declared
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.interfaces.iter().map(String::as_str)
    }

    pub fn is_from_interface(&self, interface: &str) -> bool {
        self.interfaces.contains(interface)
    }

    pub(crate) fn add_interface(&mut self, interface: &str) {
        self.interfaces.insert(interface.to_string());
    }

    /// Forget interfaces that `keep` rejects; true if anything still
    /// justifies the behavior's presence.
    pub(crate) fn retain_interfaces(&mut self, keep: impl Fn(&str) -> bool) -> bool {
        self.interfaces.retain(|i| keep(i));
        self.declared || !self.interfaces.is_empty()
    }
}

/// Return value of a behavior (`None` data type means void).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnValue {
    mode: Mode,
    data_type: Option<String>,
    description: Description,
}

impl ReturnValue {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            mode: Mode::Resolved,
            data_type: Some(data_type.into()),
            description: Description::default(),
        }
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    pub fn description(&self) -> &Description {
        &self.description
    }
}

impl Composable for ReturnValue {
    const KIND: TraitKind = TraitKind::ReturnValue;

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn compose(&self, delta: &Self, _cx: &mut Composition<'_>) -> StratumResult<Self> {
        Ok(Self {
            mode: self.mode,
            data_type: compose_attr(&self.data_type, &delta.data_type),
            description: self.description.compose(&delta.description, self.mode),
        })
    }

    fn subtract(&self, base: &Self, mode: Mode, cx: &mut Composition<'_>) -> StratumResult<Self> {
        Ok(Self {
            mode,
            data_type: subtract_attr(&self.data_type, &base.data_type, "return type", cx)?,
            description: self.description.subtract(&base.description),
        })
    }

    fn is_discardable(&self) -> bool {
        self.data_type.is_none() && self.description.is_blank()
    }

    fn overrides_structure(&self) -> bool {
        self.data_type.is_some()
    }
}

/// A named behavior parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    mode: Mode,
    data_type: String,
    direction: Option<Direction>,
    description: Description,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Resolved,
            data_type: data_type.into(),
            direction: None,
            description: Description::default(),
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn direction(&self) -> Direction {
        self.direction.unwrap_or_default()
    }

    pub fn description(&self) -> &Description {
        &self.description
    }
}

impl Composable for Parameter {
    const KIND: TraitKind = TraitKind::Parameter;

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn compose(&self, delta: &Self, _cx: &mut Composition<'_>) -> StratumResult<Self> {
        Ok(Self {
            name: self.name.clone(),
            mode: self.mode,
            data_type: self.data_type.clone(),
            direction: compose_attr(&self.direction, &delta.direction),
            description: self.description.compose(&delta.description, self.mode),
        })
    }

    fn subtract(&self, base: &Self, mode: Mode, cx: &mut Composition<'_>) -> StratumResult<Self> {
        Ok(Self {
            name: self.name.clone(),
            mode,
            data_type: self.data_type.clone(),
            direction: subtract_attr(&self.direction, &base.direction, "direction", cx)?,
            description: self.description.subtract(&base.description),
        })
    }

    fn is_discardable(&self) -> bool {
        self.direction.is_none() && self.description.is_blank()
    }

    fn overrides_structure(&self) -> bool {
        self.direction.is_some()
    }
}

/// A behavior (method) of a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Behavior {
    signature: String,
    mode: Mode,
    return_value: ReturnValue,
    parameters: Vec<Parameter>,
    is_abstract: Option<bool>,
    sealed: Option<bool>,
    implementation: Option<String>,
    description: Description,
    origin: Origin,
}

impl Behavior {
    /// Declare a new behavior at this level.
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            mode: Mode::Resolved,
            return_value: ReturnValue::default(),
            parameters: Vec::new(),
            is_abstract: None,
            sealed: None,
            implementation: None,
            description: Description::default(),
            origin: Origin::default(),
        }
    }

    /// An empty overlay of an inherited behavior.
    pub fn overlay(signature: impl Into<String>) -> Self {
        let mut behavior = Self::new(signature);
        behavior.mode = Mode::Derivation;
        behavior.return_value.mode = Mode::Derivation;
        behavior
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn returning(mut self, data_type: impl Into<String>) -> Self {
        self.return_value.data_type = Some(data_type.into());
        self
    }

    pub fn with_return_value(mut self, return_value: ReturnValue) -> Self {
        self.return_value = return_value;
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_implementation(mut self, body: impl Into<String>) -> Self {
        self.implementation = Some(body.into());
        self
    }

    pub fn abstract_behavior(mut self) -> Self {
        self.is_abstract = Some(true);
        self
    }

    pub fn sealed(mut self) -> Self {
        self.sealed = Some(true);
        self
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn return_value(&self) -> &ReturnValue {
        &self.return_value
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract.unwrap_or(false)
    }

    pub fn implementation(&self) -> Option<&str> {
        self.implementation.as_deref()
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub(crate) fn origin_mut(&mut self) -> &mut Origin {
        &mut self.origin
    }

    pub fn set_implementation(&mut self, body: Option<String>) {
        self.implementation = body;
    }

    /// Copy of an interface behavior as expanded into an implementing
    /// definition.
    pub(crate) fn expanded_from(&self, interface: &str) -> Self {
        let mut expanded = self.clone();
        expanded.mode = Mode::Resolved;
        expanded.origin = Origin::from_interface(interface);
        expanded
    }

    fn compose_parameters(
        &self,
        delta: &Self,
        cx: &mut Composition<'_>,
    ) -> StratumResult<Vec<Parameter>> {
        let mut composed = Vec::with_capacity(self.parameters.len());
        for base_param in &self.parameters {
            let param = match delta.parameter(&base_param.name) {
                Some(delta_param) => cx.scoped(TraitKind::Parameter.segment(&base_param.name), |cx| {
                    base_param.compose(delta_param, cx)
                })?,
                None => base_param.clone(),
            };
            composed.push(param);
        }
        self.discard_unmatched(&delta.parameters, cx)?;
        Ok(composed)
    }

    fn subtract_parameters(
        &self,
        base: &Self,
        mode: Mode,
        cx: &mut Composition<'_>,
    ) -> StratumResult<Vec<Parameter>> {
        let mut delta = Vec::new();
        for base_param in &base.parameters {
            if let Some(param) = self.parameter(&base_param.name) {
                let diff = cx.scoped(TraitKind::Parameter.segment(&base_param.name), |cx| {
                    param.subtract(base_param, mode, cx)
                })?;
                if !diff.is_discardable() {
                    delta.push(diff);
                }
            }
        }
        base.discard_unmatched(&self.parameters, cx)?;
        Ok(delta)
    }

    /// Report every parameter in `others` that `self` has no match for.
    fn discard_unmatched(&self, others: &[Parameter], cx: &mut Composition<'_>) -> StratumResult<()> {
        for param in others {
            if self.parameter(&param.name).is_none() {
                cx.scoped(TraitKind::Parameter.segment(&param.name), |cx| {
                    cx.warn(
                        DiagnosticKind::ParameterDiscarded,
                        format!("parameter does not match signature {}", self.signature),
                    )
                })?;
            }
        }
        Ok(())
    }
}

impl Composable for Behavior {
    const KIND: TraitKind = TraitKind::Behavior;

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn compose(&self, delta: &Self, cx: &mut Composition<'_>) -> StratumResult<Self> {
        let return_value = cx.scoped(TraitKind::ReturnValue.label().to_string(), |cx| {
            self.return_value.compose(&delta.return_value, cx)
        })?;
        let parameters = self.compose_parameters(delta, cx)?;

        Ok(Self {
            signature: self.signature.clone(),
            mode: self.mode,
            return_value,
            parameters,
            is_abstract: compose_attr(&self.is_abstract, &delta.is_abstract),
            sealed: compose_attr(&self.sealed, &delta.sealed),
            implementation: compose_attr(&self.implementation, &delta.implementation),
            description: self.description.compose(&delta.description, self.mode),
            origin: self.origin.clone(),
        })
    }

    fn subtract(&self, base: &Self, mode: Mode, cx: &mut Composition<'_>) -> StratumResult<Self> {
        let return_value = cx.scoped(TraitKind::ReturnValue.label().to_string(), |cx| {
            self.return_value.subtract(&base.return_value, mode, cx)
        })?;
        let parameters = self.subtract_parameters(base, mode, cx)?;

        Ok(Self {
            signature: self.signature.clone(),
            mode,
            return_value,
            parameters,
            is_abstract: subtract_attr(&self.is_abstract, &base.is_abstract, "abstract flag", cx)?,
            sealed: subtract_attr(&self.sealed, &base.sealed, "sealed flag", cx)?,
            implementation: subtract_attr(
                &self.implementation,
                &base.implementation,
                "implementation",
                cx,
            )?,
            description: self.description.subtract(&base.description),
            origin: Origin::default(),
        })
    }

    fn is_discardable(&self) -> bool {
        !self.overrides_structure()
            && self.description.is_blank()
            && self.return_value.is_discardable()
            && self.parameters.iter().all(Composable::is_discardable)
    }

    fn is_sealed(&self) -> bool {
        self.sealed == Some(true)
    }

    fn overrides_structure(&self) -> bool {
        self.is_abstract.is_some()
            || self.sealed.is_some()
            || self.implementation.is_some()
            || self.return_value.overrides_structure()
            || self.parameters.iter().any(Composable::overrides_structure)
    }

    /// Interface-only behaviors without an implementation are regenerated
    /// by the finalize pass and need not be persisted.
    fn declaration(&self) -> Option<Self> {
        if !self.origin.is_declared() && self.implementation.is_none() {
            return None;
        }
        let mut declared = self.clone();
        declared.mode = Mode::Resolved;
        declared.return_value.mode = Mode::Resolved;
        for param in &mut declared.parameters {
            param.mode = Mode::Resolved;
        }
        declared.origin = Origin::default();
        Some(declared)
    }
}
