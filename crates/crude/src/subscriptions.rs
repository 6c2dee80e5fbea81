//! Callbacks scoped to a set of entry identifiers.
//!
//! # Invariants
//!
//! 1. A subscription's id set only shrinks after registration: deleting an
//!    entry prunes its id from every set.
//! 2. A subscription whose set becomes empty stays registered until it is
//!    unsubscribed.
//! 3. Firing for an id yields each matching subscription once, in
//!    registration order.

use std::collections::BTreeSet;

use crate::callback::Callback;
use crate::id::EntryId;

#[derive(Debug, Clone)]
struct Subscription {
    ids: BTreeSet<EntryId>,
    callback: Callback,
}

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `ids`. Identifiers need not exist yet, or at all.
    pub fn subscribe(&mut self, ids: impl IntoIterator<Item = EntryId>, callback: &Callback) {
        self.subscriptions.push(Subscription {
            ids: ids.into_iter().collect(),
            callback: callback.clone(),
        });
    }

    /// Drop every subscription registered with `callback`. Returns how many
    /// were removed.
    pub fn unsubscribe(&mut self, callback: &Callback) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| &sub.callback != callback);
        before - self.subscriptions.len()
    }

    /// Callbacks watching `id`, in registration order.
    #[must_use]
    pub fn watchers_of(&self, id: &EntryId) -> Vec<Callback> {
        self.subscriptions
            .iter()
            .filter(|sub| sub.ids.contains(id))
            .map(|sub| sub.callback.clone())
            .collect()
    }

    /// Remove `id` from every subscription.
    pub fn forget(&mut self, id: &EntryId) {
        for sub in &mut self.subscriptions {
            sub.ids.remove(id);
        }
    }

    /// Id sets of every subscription registered with `callback`.
    #[must_use]
    pub fn watched_ids(&self, callback: &Callback) -> Vec<BTreeSet<EntryId>> {
        self.subscriptions
            .iter()
            .filter(|sub| &sub.callback == callback)
            .map(|sub| sub.ids.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<EntryId> {
        names.iter().map(|n| EntryId::from_string(*n)).collect()
    }

    #[test]
    fn watchers_match_only_their_ids() {
        let mut reg = SubscriptionRegistry::new();
        let ab = Callback::new(|| {});
        let c = Callback::new(|| {});
        reg.subscribe(ids(&["a", "b"]), &ab);
        reg.subscribe(ids(&["c"]), &c);

        assert_eq!(reg.watchers_of(&EntryId::from_string("a")), vec![ab.clone()]);
        assert_eq!(reg.watchers_of(&EntryId::from_string("c")), vec![c]);
        assert!(reg.watchers_of(&EntryId::from_string("z")).is_empty());
    }

    #[test]
    fn duplicate_ids_collapse() {
        let mut reg = SubscriptionRegistry::new();
        let cb = Callback::new(|| {});
        reg.subscribe(ids(&["a", "a", "a"]), &cb);
        assert_eq!(reg.watchers_of(&EntryId::from_string("a")).len(), 1);
    }

    #[test]
    fn unsubscribe_removes_every_registration() {
        let mut reg = SubscriptionRegistry::new();
        let cb = Callback::new(|| {});
        let other = Callback::new(|| {});
        reg.subscribe(ids(&["a"]), &cb);
        reg.subscribe(ids(&["b"]), &other);
        reg.subscribe(ids(&["c"]), &cb);

        assert_eq!(reg.unsubscribe(&cb), 2);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.unsubscribe(&cb), 0);
    }

    #[test]
    fn forget_prunes_but_keeps_subscription() {
        let mut reg = SubscriptionRegistry::new();
        let cb = Callback::new(|| {});
        reg.subscribe(ids(&["a"]), &cb);
        reg.forget(&EntryId::from_string("a"));

        assert_eq!(reg.len(), 1);
        assert_eq!(reg.watched_ids(&cb), vec![BTreeSet::new()]);
        assert!(reg.watchers_of(&EntryId::from_string("a")).is_empty());
    }
}
