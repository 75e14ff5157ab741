//! 64-bit random identifiers.
//!
//! Scenes and entities carry a [`Uuid`] that survives serialization, scene
//! copies, and editor sessions, unlike the registry's generational handles
//! which are only meaningful inside one registry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 64-bit random identifier.
///
/// Serializes as a bare integer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uuid(u64);

impl Uuid {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(rand::random())
    }

    /// Wrap a raw value (typically read back from a scene file).
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid({})", self.0)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_not_constant() {
        let a = Uuid::generate();
        let b = Uuid::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn raw_roundtrip() {
        let u = Uuid::from_raw(42);
        assert_eq!(u.to_raw(), 42);
        assert_eq!(format!("{u}"), "42");
    }

    #[test]
    fn serializes_as_integer() {
        let u = Uuid::from_raw(7);
        assert_eq!(serde_json::to_value(u).unwrap(), serde_json::json!(7));
    }
}
