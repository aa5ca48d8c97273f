//! Branded session identifier.
//!
//! Session ids are opaque strings on the wire. Freshly generated ids are
//! UUID v7 (time-ordered, high-entropy) via [`uuid::Uuid::now_v7`]; collisions
//! are treated as practically impossible rather than defended against.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a session, immutable once assigned.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wrap an id received on the wire.
    #[must_use]
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Return the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume self and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_uuid_v7() {
        let id = SessionId::new();
        let parsed = Uuid::parse_str(id.as_str()).expect("should be valid UUID");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn many_ids_pairwise_distinct() {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(SessionId::new()));
        }
    }

    #[test]
    fn from_str_ref() {
        let id = SessionId::from("abc-123");
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn display() {
        let id = SessionId::from("display-me");
        assert_eq!(format!("{id}"), "display-me");
    }

    #[test]
    fn into_string() {
        let id = SessionId::from("convert");
        let s: String = id.into();
        assert_eq!(s, "convert");
    }

    #[test]
    fn serde_is_transparent() {
        let id = SessionId::from("serde-test");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"serde-test\"");
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn hash_and_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let id = SessionId::from("same");
        let _ = set.insert(id.clone());
        let _ = set.insert(id);
        assert_eq!(set.len(), 1);
    }
}
