//! Implemented-interface sub-trait
//!
//! Carries only the interface name; the behaviors an interface contributes
//! are expanded from its type signature when the implementor is resolved.

use crate::domain::services::composition::{Composable, Composition, TraitKind};
use crate::domain::value_objects::{Mode, QualifiedName};
use crate::error::StratumResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    name: QualifiedName,
    mode: Mode,
}

impl Interface {
    pub fn new(name: impl Into<QualifiedName>) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Resolved,
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }
}

impl Composable for Interface {
    const KIND: TraitKind = TraitKind::Interface;

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn compose(&self, _delta: &Self, _cx: &mut Composition<'_>) -> StratumResult<Self> {
        Ok(self.clone())
    }

    fn subtract(&self, _base: &Self, mode: Mode, _cx: &mut Composition<'_>) -> StratumResult<Self> {
        Ok(Self {
            name: self.name.clone(),
            mode,
        })
    }

    fn is_discardable(&self) -> bool {
        self.mode.is_delta()
    }
}
