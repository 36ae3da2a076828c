// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Identifiers
//!
//! Names in the language come in two flavours:
//!
//! - **Case-insensitive**: bare identifiers (`foo`, `FOO`, `fOo` all match each other)
//! - **Case-sensitive**: quoted identifiers (`"Foo"` only matches `Foo`)
//!
//! The flavour belongs to the *reference*, not to the declaration: an alias
//! declared as `AS Foo` is found by `foo` and by `"Foo"`, but not by `"foo"`.
//!
//! ## Scope qualifiers
//!
//! A variable reference may carry an explicit `@` marker (`@x`). The marker
//! forces the lookup to consider local variables only and never consult the
//! catalog. See [`ScopeQualifier`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Case sensitivity of an identifier reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSensitivity {
    /// Quoted identifier; only the byte-exact text matches
    Sensitive,
    /// Bare identifier; letter case is ignored
    #[default]
    Insensitive,
}

impl CaseSensitivity {
    pub fn is_sensitive(&self) -> bool {
        matches!(self, CaseSensitivity::Sensitive)
    }
}

/// A name together with the case sensitivity it was written with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub text: String,
    pub case: CaseSensitivity,
}

impl Identifier {
    pub fn new(text: impl Into<String>, case: CaseSensitivity) -> Self {
        Self {
            text: text.into(),
            case,
        }
    }

    /// A bare (case-insensitive) identifier
    pub fn insensitive(text: impl Into<String>) -> Self {
        Self::new(text, CaseSensitivity::Insensitive)
    }

    /// A quoted (case-sensitive) identifier
    pub fn sensitive(text: impl Into<String>) -> Self {
        Self::new(text, CaseSensitivity::Sensitive)
    }

    /// Check whether `candidate` is matched by this identifier under its own
    /// case sensitivity.
    ///
    /// # Examples
    ///
    /// ```
    /// use nested_sql_ir::Identifier;
    ///
    /// assert!(Identifier::insensitive("FOO").matches("foo"));
    /// assert!(!Identifier::sensitive("FOO").matches("foo"));
    /// ```
    pub fn matches(&self, candidate: &str) -> bool {
        match self.case {
            CaseSensitivity::Sensitive => self.text == candidate,
            CaseSensitivity::Insensitive => eq_ignore_case(&self.text, candidate),
        }
    }

    /// Case-insensitive equality of the underlying text, regardless of the
    /// sensitivity of either side. Used for duplicate declaration checks.
    pub fn same_name(&self, other: &Identifier) -> bool {
        eq_ignore_case(&self.text, &other.text)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.case {
            CaseSensitivity::Sensitive => write!(f, "\"{}\"", self.text),
            CaseSensitivity::Insensitive => write!(f, "{}", self.text),
        }
    }
}

/// Unicode-aware case folding comparison
pub fn eq_ignore_case(left: &str, right: &str) -> bool {
    left.chars()
        .flat_map(char::to_lowercase)
        .eq(right.chars().flat_map(char::to_lowercase))
}

/// Where a variable reference is allowed to look for its binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeQualifier {
    /// Locals first, then the catalog (globals first in FROM table position)
    #[default]
    Default,
    /// `@name`: locals only, the catalog is never consulted
    LocalsOnly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insensitive_matching() {
        let id = Identifier::insensitive("fOo");
        assert!(id.matches("FOO"));
        assert!(id.matches("foo"));
        assert!(!id.matches("food"));
    }

    #[test]
    fn test_sensitive_matching() {
        let id = Identifier::sensitive("Foo");
        assert!(id.matches("Foo"));
        assert!(!id.matches("foo"));
        assert!(!id.matches("FOO"));
    }

    #[test]
    fn test_same_name_ignores_sensitivity() {
        let a = Identifier::sensitive("A");
        let b = Identifier::insensitive("a");
        assert!(a.same_name(&b));
    }

    #[test]
    fn test_unicode_case_folding() {
        assert!(eq_ignore_case("ÄPFEL", "äpfel"));
        assert!(!eq_ignore_case("äpfel", "apfel"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Identifier::sensitive("Foo").to_string(), "\"Foo\"");
        assert_eq!(Identifier::insensitive("foo").to_string(), "foo");
    }
}
