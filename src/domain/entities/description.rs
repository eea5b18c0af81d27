//! Layered description text
//!
//! A resolved element carries its full description. A delta carries only
//! the text added at its level, plus a flag saying whether that text
//! replaces the inherited description instead of extending it.

use crate::domain::value_objects::Mode;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    text: String,
    replace: bool,
}

impl Description {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            replace: false,
        }
    }

    /// A delta description that discards whatever was inherited.
    pub fn replacing(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            replace: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_replacing(&self) -> bool {
        self.replace
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && !self.replace
    }

    /// Apply `delta` on top of this description; `mode` is the mode of the
    /// composed element.
    pub fn compose(&self, delta: &Description, mode: Mode) -> Description {
        let (text, replace) = if delta.replace {
            (delta.text.clone(), true)
        } else {
            (join(&self.text, &delta.text), self.replace)
        };

        Description {
            text,
            // a resolved description is always complete
            replace: replace && !mode.is_resolved(),
        }
    }

    /// Recover the delta that turns `base` into `self`.
    pub fn subtract(&self, base: &Description) -> Description {
        if self.text == base.text {
            return Description::default();
        }
        if base.text.is_empty() {
            return Description::new(self.text.clone());
        }

        let suffix = self
            .text
            .strip_prefix(base.text.as_str())
            .and_then(|rest| rest.strip_prefix('\n'))
            .filter(|rest| !rest.is_empty());

        match suffix {
            Some(rest) => Description::new(rest),
            None => Description::replacing(self.text.clone()),
        }
    }
}

fn join(base: &str, addition: &str) -> String {
    match (base.is_empty(), addition.is_empty()) {
        (_, true) => base.to_string(),
        (true, false) => addition.to_string(),
        (false, false) => format!("{}\n{}", base, addition),
    }
}
