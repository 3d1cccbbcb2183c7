//! Cell identifiers backed by a global string interner.
//!
//! [`Id`] is a `Copy` handle that compares and hashes in constant time, which
//! makes it a cheap key for the cell arena and for visited sets during
//! traversal.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Identifier of a cell.
///
/// # Examples
///
/// ```
/// use cellgraph_core::identifier::Id;
///
/// let node = Id::new("node-1");
/// assert_eq!(node, "node-1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string, interning it on first use.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns an owned copy of the identifier text.
    pub fn as_string(&self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_string()
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                == other
        })
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("vertex");
        let id2 = Id::new("vertex");
        let id3 = Id::new("edge");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "vertex");
    }

    #[test]
    fn test_display_and_parse() {
        let id: Id = "lane".parse().unwrap();
        assert_eq!(id.to_string(), "lane");
        assert_eq!(Id::from("lane"), id);
    }
}
