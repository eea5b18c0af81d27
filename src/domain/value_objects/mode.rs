//! Composition mode value objects
//!
//! - `Resolved`: self-contained, fully merged
//! - `Derivation`: inheritance delta against a named base
//! - `Modification`: local customization overlaying a derivation
//! - `Invalid`: discarded or corrupt

use serde::{Deserialize, Serialize};

/// Composition state of a definition or one of its sub-traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Resolved,
    Derivation,
    Modification,
    Invalid,
}

impl Mode {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Mode::Resolved)
    }

    /// True for the two delta modes.
    pub fn is_delta(&self) -> bool {
        matches!(self, Mode::Derivation | Mode::Modification)
    }

    /// Whether a delta in `self` mode may be applied to a base in `base` mode.
    ///
    /// ```text
    /// R + D -> R    R + M -> R    D + M -> D    M + M -> M
    /// ```
    pub fn applies_to(&self, base: Mode) -> bool {
        match self {
            Mode::Derivation => base == Mode::Resolved,
            Mode::Modification => base != Mode::Invalid,
            Mode::Resolved | Mode::Invalid => false,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Resolved => write!(f, "resolved"),
            Mode::Derivation => write!(f, "derivation"),
            Mode::Modification => write!(f, "modification"),
            Mode::Invalid => write!(f, "invalid"),
        }
    }
}

/// What a definition describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    /// A layered entity definition
    #[default]
    Component,
    /// An immutable external type description
    Signature,
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefinitionKind::Component => write!(f, "definition"),
            DefinitionKind::Signature => write!(f, "type signature"),
        }
    }
}
