//! Global variable names — validation and interning.
//!
//! A [`Name`] is the canonical handle for a slot key. Raw strings are
//! validated once at the boundary and interned into a process-wide table,
//! so equality checks inside the registry are pointer comparisons in the
//! common case and the rest of the core never sees raw, unvalidated text.
//!
//! The naming convention requires the `$` sigil. The host runtime this
//! registry was ported from supports sigil-less globals internally but
//! exposes no way to interact with them, so the sigil check is kept.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};

use crate::error::{GvarError, Result};

/// Process-wide intern table. Names are never evicted; the set of distinct
/// global names in a process is small and stable.
static INTERNER: Lazy<DashMap<Arc<str>, ()>> = Lazy::new(DashMap::new);

/// An interned, validated global variable name.
///
/// Two names compare equal iff their underlying strings are equal.
/// Interning the same string twice yields handles backed by the same
/// allocation, so the equality fast path is a pointer comparison.
#[derive(Debug, Clone)]
pub struct Name(Arc<str>);

impl Name {
    /// Validate `raw` and intern it into a `Name`.
    ///
    /// Fails with [`GvarError::InvalidName`] if `raw` is empty, does not
    /// start with `$`, is the bare sigil, or contains a NUL byte.
    pub fn intern(raw: &str) -> Result<Name> {
        Self::check(raw)?;
        if let Some(entry) = INTERNER.get(raw) {
            return Ok(Name(entry.key().clone()));
        }
        let arc: Arc<str> = Arc::from(raw);
        // Entry API so two racing interns of a new name converge on one
        // allocation.
        let entry = INTERNER.entry(arc).or_insert(());
        Ok(Name(entry.key().clone()))
    }

    /// Look up `raw` without interning it.
    ///
    /// Returns `None` for invalid names and for valid names that have
    /// never been interned. Never fails — this is the permissive path
    /// behind `defined`, and it must not pollute the intern table with
    /// names that are merely being probed.
    pub fn lookup(raw: &str) -> Option<Name> {
        if Self::check(raw).is_err() {
            return None;
        }
        INTERNER.get(raw).map(|entry| Name(entry.key().clone()))
    }

    fn check(raw: &str) -> Result<()> {
        let invalid = || GvarError::InvalidName {
            name: raw.to_string(),
        };
        if raw.len() < 2 || !raw.starts_with('$') {
            return Err(invalid());
        }
        // NUL cannot appear in a host name string.
        if raw.as_bytes().contains(&0) {
            return Err(invalid());
        }
        Ok(())
    }

    /// The canonical string form (sigil included).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Name::intern(&raw).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_valid_name() {
        let name = Name::intern("$test_intern_valid").unwrap();
        assert_eq!(name.as_str(), "$test_intern_valid");
        assert_eq!(name.to_string(), "$test_intern_valid");
    }

    #[test]
    fn test_intern_is_idempotent_and_pointer_identical() {
        let a = Name::intern("$test_idempotent").unwrap();
        let b = Name::intern("$test_idempotent").unwrap();
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn test_invalid_names_rejected() {
        for raw in ["", "$", "no_sigil", "x$y", "$a\0b"] {
            let err = Name::intern(raw).unwrap_err();
            assert!(
                matches!(err, GvarError::InvalidName { .. }),
                "expected InvalidName for {raw:?}"
            );
        }
    }

    #[test]
    fn test_invalid_name_message() {
        let err = Name::intern("stdout").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'stdout' is not allowed as a global variable name"
        );
    }

    #[test]
    fn test_lookup_does_not_intern() {
        assert!(Name::lookup("$test_never_interned").is_none());
        // Still not interned after the probe.
        assert!(Name::lookup("$test_never_interned").is_none());

        Name::intern("$test_probe_then_hit").unwrap();
        assert!(Name::lookup("$test_probe_then_hit").is_some());
    }

    #[test]
    fn test_lookup_invalid_name_is_none_not_error() {
        assert!(Name::lookup("").is_none());
        assert!(Name::lookup("bogus").is_none());
    }

    #[test]
    fn test_equality_is_by_string() {
        let a = Name::intern("$test_eq_a").unwrap();
        let b = Name::intern("$test_eq_b").unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_serde_round_trip() {
        let name = Name::intern("$test_serde").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"$test_serde\"");

        let back: Name = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn test_deserialize_validates() {
        let err = serde_json::from_str::<Name>("\"not_a_global\"");
        assert!(err.is_err());
    }
}
