//! Stored entries and the persistent state map.
//!
//! # Design
//!
//! [`Snapshot<V>`] is built on `im` persistent collections, so cloning a
//! snapshot is O(1) and the clone shares structure with its source. The
//! store performs every mutation on a fresh clone and then installs it,
//! which gives each snapshot value semantics: a snapshot obtained before a
//! mutation never observes that mutation.
//!
//! # Invariants
//!
//! 1. `index` and `entries` always describe the same set of identifiers.
//! 2. Iteration order is creation order; replacing a value keeps an entry's
//!    position.
//! 3. Sequence numbers are never reused within one lineage of snapshots.

use crate::callback::Callback;
use crate::id::EntryId;

/// A stored value, optionally derived from other entries.
#[derive(Debug, Clone)]
pub enum Entry<V> {
    /// A value written directly by the host.
    Plain { value: V },
    /// A value computed from other entries.
    ///
    /// `recompute` is the callback registered on the dependencies; it is kept
    /// here so deleting the entry can unsubscribe it.
    Derived { value: V, recompute: Callback },
}

impl<V> Entry<V> {
    #[must_use]
    pub fn value(&self) -> &V {
        match self {
            Self::Plain { value } | Self::Derived { value, .. } => value,
        }
    }

    #[must_use]
    pub fn into_value(self) -> V {
        match self {
            Self::Plain { value } | Self::Derived { value, .. } => value,
        }
    }

    #[must_use]
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Derived { .. })
    }

    /// The recompute callback of a derived entry.
    #[must_use]
    pub fn recompute(&self) -> Option<&Callback> {
        match self {
            Self::Plain { .. } => None,
            Self::Derived { recompute, .. } => Some(recompute),
        }
    }

    /// Same variant, new value.
    #[must_use]
    pub fn with_value(self, value: V) -> Self {
        match self {
            Self::Plain { .. } => Self::Plain { value },
            Self::Derived { recompute, .. } => Self::Derived { value, recompute },
        }
    }
}

/// One element of a full listing: an identifier and its current value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item<V> {
    pub id: EntryId,
    pub value: V,
}

/// Immutable view of the whole store at one point in time.
#[derive(Debug, Clone)]
pub struct Snapshot<V> {
    index: im::HashMap<EntryId, u64>,
    entries: im::OrdMap<u64, (EntryId, Entry<V>)>,
    next_seq: u64,
}

impl<V: Clone> Default for Snapshot<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Snapshot<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: im::HashMap::new(),
            entries: im::OrdMap::new(),
            next_seq: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &EntryId) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn entry(&self, id: &EntryId) -> Option<&Entry<V>> {
        let seq = self.index.get(id)?;
        self.entries.get(seq).map(|(_, entry)| entry)
    }

    #[must_use]
    pub fn get(&self, id: &EntryId) -> Option<&V> {
        self.entry(id).map(Entry::value)
    }

    /// Identifiers and values in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntryId, &V)> + '_ {
        self.entries.iter().map(|(_, (id, entry))| (id, entry.value()))
    }

    /// Owned listing in creation order.
    #[must_use]
    pub fn items(&self) -> Vec<Item<V>> {
        self.iter()
            .map(|(id, value)| Item {
                id: id.clone(),
                value: value.clone(),
            })
            .collect()
    }

    /// Add a new entry at the end. Returns `false`, leaving the snapshot
    /// untouched, when `id` is already present.
    pub(crate) fn insert(&mut self, id: EntryId, entry: Entry<V>) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(id.clone(), seq);
        self.entries.insert(seq, (id, entry));
        true
    }

    /// Swap the value of an existing entry, keeping its variant. Returns
    /// `false` when `id` is absent.
    pub(crate) fn replace_value(&mut self, id: &EntryId, value: V) -> bool {
        let Some(seq) = self.index.get(id).copied() else {
            return false;
        };
        match self.entries.get_mut(&seq) {
            Some((_, Entry::Plain { value: slot } | Entry::Derived { value: slot, .. })) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Promote an entry to a derived entry. Returns `false` when `id` is
    /// absent.
    pub(crate) fn attach_recompute(&mut self, id: &EntryId, recompute: Callback) -> bool {
        let Some(seq) = self.index.get(id).copied() else {
            return false;
        };
        match self.entries.get_mut(&seq) {
            Some(slot) => {
                let value = slot.1.value().clone();
                slot.1 = Entry::Derived { value, recompute };
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &EntryId) -> Option<Entry<V>> {
        let seq = self.index.remove(id)?;
        self.entries.remove(&seq).map(|(_, entry)| entry)
    }
}
