//! Property sub-trait

use serde::{Deserialize, Serialize};

use crate::domain::entities::Description;
use crate::domain::services::composition::{
    compose_attr, subtract_attr, Composable, Composition, TraitKind,
};
use crate::domain::value_objects::Mode;
use crate::error::StratumResult;

/// Accessibility of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// A named, typed attribute of a definition.
///
/// Unset attributes (`None`) are inherited from the base when composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    mode: Mode,
    data_type: Option<String>,
    default_value: Option<String>,
    visibility: Option<Visibility>,
    sealed: Option<bool>,
    description: Description,
}

impl Property {
    /// Declare a new property at this level.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Resolved,
            data_type: Some(data_type.into()),
            default_value: None,
            visibility: None,
            sealed: None,
            description: Description::default(),
        }
    }

    /// An empty overlay of an inherited property.
    pub fn overlay(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Derivation,
            data_type: None,
            default_value: None,
            visibility: None,
            sealed: None,
            description: Description::default(),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility.unwrap_or_default()
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn set_default_value(&mut self, value: Option<String>) {
        self.default_value = value;
    }

    pub fn set_description(&mut self, description: Description) {
        self.description = description;
    }
}

impl Composable for Property {
    const KIND: TraitKind = TraitKind::Property;

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
            data_type: compose_attr(&self.data_type, &delta.data_type),
            default_value: compose_attr(&self.default_value, &delta.default_value),
            visibility: compose_attr(&self.visibility, &delta.visibility),
            sealed: compose_attr(&self.sealed, &delta.sealed),
            description: self.description.compose(&delta.description, self.mode),
        })
    }

    fn subtract(&self, base: &Self, mode: Mode, cx: &mut Composition<'_>) -> StratumResult<Self> {
        Ok(Self {
            name: self.name.clone(),
            mode,
            data_type: subtract_attr(&self.data_type, &base.data_type, "data type", cx)?,
            default_value: subtract_attr(&self.default_value, &base.default_value, "default value", cx)?,
            visibility: subtract_attr(&self.visibility, &base.visibility, "visibility", cx)?,
            sealed: subtract_attr(&self.sealed, &base.sealed, "sealed flag", cx)?,
            description: self.description.subtract(&base.description),
        })
    }

    fn is_discardable(&self) -> bool {
        !self.overrides_structure() && self.description.is_blank()
    }

    fn is_sealed(&self) -> bool {
        self.sealed == Some(true)
    }

    fn overrides_structure(&self) -> bool {
        self.data_type.is_some()
            || self.default_value.is_some()
            || self.visibility.is_some()
            || self.sealed.is_some()
    }
}
