//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod diagnostic;
mod mode;
mod qualified_name;

pub use diagnostic::{
    Diagnostic, DiagnosticKind, Diagnostics, Severity, DEFAULT_DIAGNOSTIC_LIMIT,
};
pub use mode::{DefinitionKind, Mode};
pub use qualified_name::QualifiedName;
