//! Diagnostic value objects
//!
//! Every resolve/extract call appends to a `Diagnostics` list whenever it
//! drops, renames or orphans an element. Callers decide whether the
//! accumulated list should abort their operation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DefinitionError, StratumResult};

/// Default capacity of a diagnostics list
pub const DEFAULT_DIAGNOSTIC_LIMIT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// What happened to the offending element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A delta declared an element that already exists in its base
    NameCollision,
    /// A delta overlays an element its base does not have
    Orphaned,
    /// A delta tried to change a sealed element
    SealedOverride,
    /// A delta declared an element with a reserved name
    ReservedName,
    /// A behavior parameter could not be matched to the base signature
    ParameterDiscarded,
    /// An inherited element is missing from a derived definition
    Discarded,
    /// A composed element had to be forced into resolved mode
    ForcedResolve,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::NameCollision => "name-collision",
            DiagnosticKind::Orphaned => "orphaned",
            DiagnosticKind::SealedOverride => "sealed-override",
            DiagnosticKind::ReservedName => "reserved-name",
            DiagnosticKind::ParameterDiscarded => "parameter-discarded",
            DiagnosticKind::Discarded => "discarded",
            DiagnosticKind::ForcedResolve => "forced-resolve",
        };
        write!(f, "{}", s)
    }
}

/// One recorded composition problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    /// Path of the offending element (`Base.Child/property:Color`)
    pub path: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        severity: Severity,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            path: path.into(),
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(kind, Severity::Warning, message, path)
    }

    /// True for anything callers needing correctness must look at.
    pub fn is_conflict(&self) -> bool {
        self.severity >= Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} ({})",
            self.severity, self.kind, self.message, self.path
        )
    }
}

/// Appendable, bounded list of diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    limit: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_DIAGNOSTIC_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Append a diagnostic, failing once the list is full.
    pub fn push(&mut self, diagnostic: Diagnostic) -> StratumResult<()> {
        if self.entries.len() >= self.limit {
            return Err(DefinitionError::DiagnosticsOverflow { limit: self.limit });
        }

        match diagnostic.severity {
            Severity::Info => tracing::debug!(path = %diagnostic.path, "{}", diagnostic.message),
            Severity::Warning => tracing::warn!(path = %diagnostic.path, "{}", diagnostic.message),
            Severity::Error => tracing::error!(path = %diagnostic.path, "{}", diagnostic.message),
        }

        self.entries.push(diagnostic);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn has_conflicts(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_conflict)
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
