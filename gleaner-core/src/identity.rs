//! Deterministic identifiers.

use std::fmt::Write;

use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};

use crate::error::CoreError;

/// Builds a stable identifier from an ordered list of string parts.
///
/// The parts are joined with `:` and hashed with SHA-1; the lowercase hex
/// digest is returned. Identical parts always produce the same identifier,
/// which is what makes items safe to deduplicate downstream.
///
/// # Errors
///
/// Returns [`CoreError::InvalidData`] when no parts are given or any part
/// is empty.
pub fn uuid<S: AsRef<str>>(parts: &[S]) -> Result<String, CoreError> {
    if parts.is_empty() {
        return Err(CoreError::InvalidData("uuid requires at least one part".to_string()));
    }
    if parts.iter().any(|p| p.as_ref().is_empty()) {
        return Err(CoreError::InvalidData("uuid parts cannot be empty".to_string()));
    }

    let joined = parts.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(":");
    let hash = digest(&SHA1_FOR_LEGACY_USE_ONLY, joined.as_bytes());

    let mut hex = String::with_capacity(40);
    for byte in hash.as_ref() {
        let _ = write!(hex, "{byte:02x}");
    }
    Ok(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            uuid(&["abc"]).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_parts_are_colon_joined() {
        assert_eq!(uuid(&["a", "b"]).unwrap(), uuid(&["a:b"]).unwrap());
        assert_ne!(uuid(&["a", "b"]).unwrap(), uuid(&["b", "a"]).unwrap());
    }

    #[test]
    fn test_stable_across_calls() {
        let first = uuid(&["https://ci.example.org", "job/1"]).unwrap();
        let second = uuid(&[String::from("https://ci.example.org"), String::from("job/1")]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 40);
    }

    #[test]
    fn test_rejects_empty_parts() {
        assert!(uuid::<&str>(&[]).is_err());
        assert!(uuid(&["a", ""]).is_err());
    }
}
