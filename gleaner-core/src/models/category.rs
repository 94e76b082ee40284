//! Item categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Category
// ============================================================================

/// Kind of item a backend produces.
///
/// Each backend declares the subset it supports; asking a backend for any
/// other category is rejected before a network call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Number of search hits for a keyword query.
    Hits,
    /// A CI build record.
    Build,
}

impl Category {
    /// Returns the wire name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hits => "hits",
            Self::Build => "build",
        }
    }

    /// Returns every known category.
    pub fn all() -> &'static [Category] {
        &[Self::Hits, Self::Build]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|c| c.as_str() == s.trim())
            .copied()
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known() {
        assert_eq!("hits".parse::<Category>().unwrap(), Category::Hits);
        assert_eq!(" build ".parse::<Category>().unwrap(), Category::Build);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "issue".parse::<Category>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownCategory(ref c) if c == "issue"));
    }

    #[test]
    fn test_serde_matches_display() {
        let json = serde_json::to_string(&Category::Build).unwrap();
        assert_eq!(json, "\"build\"");
        assert_eq!(Category::Hits.to_string(), "hits");
    }
}
