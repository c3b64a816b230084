//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep dotted module names validated once at the
//! boundary, and make loader-facing signatures more expressive.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::InvalidModuleName;

/// Dotted module identifier (validated, non-empty segments)
///
/// Examples: `a`, `a.b`, `json.decoder`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleName(String);

impl ModuleName {
    /// Validate a dotted name
    ///
    /// # Errors
    /// Returns an error if the name is empty, has an empty segment, or a
    /// segment contains characters other than ASCII alphanumerics, `_`, `-`.
    pub fn parse(name: &str) -> Result<Self, InvalidModuleName> {
        let valid = !name.is_empty()
            && name.split('.').all(|segment| {
                !segment.is_empty()
                    && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            });

        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(InvalidModuleName(name.to_string()))
        }
    }

    /// Name under which the target program itself executes
    #[must_use]
    pub fn main() -> Self {
        Self("__main__".to_string())
    }

    /// Get the name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Structural depth of the name: `1 + number of '.'`
    #[must_use]
    pub fn level(&self) -> u32 {
        let dots = self.0.bytes().filter(|&b| b == b'.').count();
        u32::try_from(dots).map_or(u32::MAX, |d| d.saturating_add(1))
    }

    /// Enclosing package, if any (`a.b.c` → `a.b`)
    #[must_use]
    pub fn parent(&self) -> Option<ModuleName> {
        self.0.rsplit_once('.').map(|(parent, _)| ModuleName(parent.to_string()))
    }

    /// Name segments in order
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ModuleName {
    type Error = InvalidModuleName;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        ModuleName::parse(&name)
    }
}

impl From<ModuleName> for String {
    fn from(name: ModuleName) -> Self {
        name.0
    }
}

/// Kind of loader that executes a module file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderKind {
    /// Native extension (shared library)
    Native,
    /// Plain-text module program
    Source,
    /// Precompiled module image
    Precompiled,
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoaderKind::Native => "native",
            LoaderKind::Source => "source",
            LoaderKind::Precompiled => "precompiled",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_level_counts_segments() {
        assert_eq!(ModuleName::parse("a").unwrap().level(), 1);
        assert_eq!(ModuleName::parse("a.b").unwrap().level(), 2);
        assert_eq!(ModuleName::parse("a.b.c").unwrap().level(), 3);
    }

    #[test]
    fn test_module_parent() {
        let name = ModuleName::parse("a.b.c").unwrap();
        assert_eq!(name.parent(), Some(ModuleName::parse("a.b").unwrap()));
        assert_eq!(ModuleName::parse("a").unwrap().parent(), None);
    }

    #[test]
    fn test_invalid_module_names_rejected() {
        assert!(ModuleName::parse("").is_err());
        assert!(ModuleName::parse("a..b").is_err());
        assert!(ModuleName::parse(".a").is_err());
        assert!(ModuleName::parse("a/b").is_err());
    }

    #[test]
    fn test_module_name_deserializes_with_validation() {
        let ok: ModuleName = serde_json::from_str("\"pkg.mod\"").unwrap();
        assert_eq!(ok.as_str(), "pkg.mod");

        let bad: Result<ModuleName, _> = serde_json::from_str("\"pkg..mod\"");
        assert!(bad.is_err());
    }
}
