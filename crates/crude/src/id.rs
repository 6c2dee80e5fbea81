//! Entry identifiers and the sources that mint them.
//!
//! The store never interprets an identifier: it only needs each one to be
//! unique for the lifetime of the store. [`UuidIds`] is the default source;
//! [`SequentialIds`] produces predictable identifiers for tests and for
//! hosts that want reproducible ids.

use std::fmt;

use uuid::Uuid;

/// Opaque, unique identifier of a store entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntryId(String);

impl EntryId {
    /// Wrap an existing string.
    ///
    /// Used by hosts that persist identifiers and hand them back later. The
    /// store does not check that the id was ever issued; lookups with an
    /// unknown id fail with `NotFound`.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Producer of fresh identifiers.
///
/// Implementations must never return the same identifier twice within one
/// store, closures included. A repeated identifier is a contract violation:
/// [`Store::create`](crate::Store::create) panics on it rather than
/// overwrite the live entry.
pub trait IdSource {
    fn next_id(&mut self) -> EntryId;
}

/// Random version 4 UUIDs in hyphenated form.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> EntryId {
        EntryId(Uuid::new_v4().to_string())
    }
}

/// `prefix-1`, `prefix-2`, ... in issue order.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("entry")
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> EntryId {
        let id = EntryId(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

impl<F> IdSource for F
where
    F: FnMut() -> EntryId,
{
    fn next_id(&mut self) -> EntryId {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_ids_are_hyphenated_v4() {
        let mut ids = UuidIds;
        let id = ids.next_id();
        let parsed = Uuid::parse_str(id.as_str()).expect("valid uuid");
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id.as_str().len(), 36);
        assert_eq!(id.as_str().matches('-').count(), 4);
    }

    #[test]
    fn uuid_ids_do_not_repeat() {
        let mut ids = UuidIds;
        let seen: HashSet<_> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::new("n");
        assert_eq!(ids.next_id().as_str(), "n-1");
        assert_eq!(ids.next_id().as_str(), "n-2");
        assert_eq!(SequentialIds::default().next_id().as_str(), "entry-1");
    }

    #[test]
    fn closures_are_id_sources() {
        let mut n = 0;
        let mut source = move || {
            n += 10;
            EntryId::from_string(format!("k{n}"))
        };
        assert_eq!(IdSource::next_id(&mut source).as_str(), "k10");
        assert_eq!(IdSource::next_id(&mut source).as_str(), "k20");
    }

    #[test]
    fn display_is_the_raw_string() {
        let id = EntryId::from_string("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id.as_ref(), "abc");
    }
}
