//! Qualified name value object
//!
//! Definitions are addressed by dot-separated hierarchical names
//! (`Base.Child.Grandchild`). The empty name addresses the root definition.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between name segments
pub const SEPARATOR: char = '.';

/// Separator between a definition and a contained child definition
pub const NESTED_SEPARATOR: char = '$';

/// A hierarchical, dot-separated definition name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Create a name from its dotted form.
    ///
    /// Leading/trailing separators and empty segments are dropped, so
    /// `".a..b."` and `"a.b"` name the same definition.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        if !name.contains(SEPARATOR) {
            return Self(name.trim().to_string());
        }

        let joined = name
            .split(SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(".");
        Self(joined)
    }

    /// The empty-named root definition.
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Last segment (`Grandchild` for `Base.Child.Grandchild`).
    pub fn simple_name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Enclosing name; the parent of a single-segment name is the root,
    /// and the root has no parent.
    pub fn parent(&self) -> Option<QualifiedName> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(SEPARATOR) {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Package portion of the name (everything before the simple name).
    pub fn package(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    pub fn child(&self, simple_name: &str) -> QualifiedName {
        if self.is_root() {
            Self::new(simple_name)
        } else {
            Self::new(format!("{}{}{}", self.0, SEPARATOR, simple_name))
        }
    }

    /// Name of a child definition contained in this one (`Panel$Button`).
    pub fn nested(&self, key: &str) -> QualifiedName {
        Self(format!("{}{}{}", self.0, NESTED_SEPARATOR, key))
    }

    /// True if `self` is strictly nested below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &QualifiedName) -> bool {
        if self == ancestor {
            return false;
        }
        if ancestor.is_root() {
            return true;
        }
        self.0
            .strip_prefix(ancestor.as_str())
            .is_some_and(|rest| rest.starts_with(SEPARATOR))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for QualifiedName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for QualifiedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
