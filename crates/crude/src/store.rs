//! The entry store: create, read, update and delete with change fan-out.
//!
//! # Design
//!
//! [`Store<V>`] is a cheap handle onto shared, single-threaded state
//! (`Rc<RefCell<..>>`). Cloning a handle addresses the same store; each
//! [`Store::new`] is independent.
//!
//! Every mutation builds the next [`Snapshot`] from a clone of the current
//! one and installs it, so snapshots and values handed out earlier are never
//! affected by later mutations.
//!
//! Callbacks run after the state borrow is released. A callback may call
//! back into the store; the nested operation runs to completion on the same
//! call stack before the outer notification pass continues.
//!
//! # Invariants
//!
//! 1. A failed operation changes nothing and notifies no one.
//! 2. Each successful create, update or delete runs one change pass.
//! 3. Update then runs one pass over the subscriptions watching the id.
//! 4. Delete unsubscribes a derived entry's recompute callback before the
//!    entry is removed, and prunes the id from every subscription after the
//!    change pass.
//! 5. Each pass iterates over a copy taken when the pass starts.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::callback::Callback;
use crate::entry::{Entry, Item, Snapshot};
use crate::error::{Result, StoreError};
use crate::id::{EntryId, IdSource, UuidIds};
use crate::notifier::ChangeNotifier;
use crate::subscriptions::SubscriptionRegistry;

struct StoreInner<V> {
    state: Snapshot<V>,
    ids: Box<dyn IdSource>,
    notifier: ChangeNotifier,
    registry: SubscriptionRegistry,
}

/// Reactive in-memory key-value store.
pub struct Store<V> {
    inner: Rc<RefCell<StoreInner<V>>>,
}

impl<V> Clone for Store<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Store")
            .field("state", &inner.state)
            .field("change_callbacks", &inner.notifier.len())
            .field("subscriptions", &inner.registry.len())
            .finish()
    }
}

impl<V: Clone + 'static> Default for Store<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-owning handle held by recompute callbacks.
pub(crate) struct WeakStore<V> {
    inner: Weak<RefCell<StoreInner<V>>>,
}

impl<V> WeakStore<V> {
    pub(crate) fn upgrade(&self) -> Option<Store<V>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl<V: Clone + 'static> Store<V> {
    /// Empty store issuing random UUID identifiers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_source(UuidIds)
    }

    /// Empty store issuing identifiers from `ids`.
    #[must_use]
    pub fn with_id_source(ids: impl IdSource + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                state: Snapshot::new(),
                ids: Box::new(ids),
                notifier: ChangeNotifier::new(),
                registry: SubscriptionRegistry::new(),
            })),
        }
    }

    /// Store `value` under a fresh identifier.
    ///
    /// # Panics
    ///
    /// Panics if the id source returns an identifier that is already live.
    /// The store, its callbacks and subscriptions are left unchanged.
    pub fn create(&self, value: V) -> EntryId {
        let (id, pass) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.ids.next_id();
            let mut next = inner.state.clone();
            assert!(
                next.insert(id.clone(), Entry::Plain { value }),
                "id source repeated {id}"
            );
            inner.state = next;
            (id, inner.notifier.pass())
        };
        debug!(message = "store.create", id = %id);
        self.run_change_pass(pass);
        id
    }

    /// Current value of `id`.
    pub fn read(&self, id: &EntryId) -> Result<V> {
        self.inner
            .borrow()
            .state
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    /// Every entry with its current value, in creation order.
    #[must_use]
    pub fn read_all(&self) -> Vec<Item<V>> {
        self.inner.borrow().state.items()
    }

    /// Replace the value of `id`, keeping it derived if it was.
    pub fn update(&self, id: &EntryId, value: V) -> Result<()> {
        let pass = {
            let mut inner = self.inner.borrow_mut();
            if !inner.state.contains(id) {
                return Err(StoreError::not_found(id));
            }
            let mut next = inner.state.clone();
            next.replace_value(id, value);
            inner.state = next;
            inner.notifier.pass()
        };
        debug!(message = "store.update", id = %id);
        self.run_change_pass(pass);

        let watchers = self.inner.borrow().registry.watchers_of(id);
        trace!(message = "store.fire", id = %id, watchers = watchers.len());
        for cb in watchers {
            cb.invoke();
        }
        Ok(())
    }

    /// Remove `id`.
    pub fn delete(&self, id: &EntryId) -> Result<()> {
        let pass = {
            let mut inner = self.inner.borrow_mut();
            let recompute = match inner.state.entry(id) {
                Some(entry) => entry.recompute().cloned(),
                None => return Err(StoreError::not_found(id)),
            };
            if let Some(cb) = recompute {
                inner.registry.unsubscribe(&cb);
            }
            let mut next = inner.state.clone();
            next.remove(id);
            inner.state = next;
            inner.notifier.pass()
        };
        debug!(message = "store.delete", id = %id);
        self.run_change_pass(pass);
        self.inner.borrow_mut().registry.forget(id);
        Ok(())
    }

    pub fn add_change_callback(&self, callback: &Callback) {
        self.inner.borrow_mut().notifier.add(callback);
    }

    /// Returns whether `callback` was registered.
    pub fn remove_change_callback(&self, callback: &Callback) -> bool {
        self.inner.borrow_mut().notifier.remove(callback)
    }

    /// Run `callback` whenever one of `ids` is updated.
    pub fn subscribe(&self, ids: impl IntoIterator<Item = EntryId>, callback: &Callback) {
        self.inner.borrow_mut().registry.subscribe(ids, callback);
    }

    /// Drop every subscription made with `callback`; returns how many.
    pub fn unsubscribe(&self, callback: &Callback) -> usize {
        self.inner.borrow_mut().registry.unsubscribe(callback)
    }

    /// The raw state as of now.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<V> {
        self.inner.borrow().state.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().state.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().state.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &EntryId) -> bool {
        self.inner.borrow().state.contains(id)
    }

    /// Whether `id` is a derived entry.
    pub fn is_derived(&self, id: &EntryId) -> Result<bool> {
        self.inner
            .borrow()
            .state
            .entry(id)
            .map(Entry::is_derived)
            .ok_or_else(|| StoreError::not_found(id))
    }

    #[must_use]
    pub fn change_callback_count(&self) -> usize {
        self.inner.borrow().notifier.len()
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.borrow().registry.len()
    }

    /// Id sets currently watched by `callback`, one per subscription.
    #[must_use]
    pub fn watched_ids(&self, callback: &Callback) -> Vec<BTreeSet<EntryId>> {
        self.inner.borrow().registry.watched_ids(callback)
    }

    /// Values of `ids`, positionally, all read from one snapshot.
    pub(crate) fn read_many(&self, ids: &[EntryId]) -> Result<Vec<V>> {
        let state = self.snapshot();
        ids.iter()
            .map(|id| state.get(id).cloned().ok_or_else(|| StoreError::not_found(id)))
            .collect()
    }

    /// Mark `id` as derived. Installs a new snapshot but notifies no one.
    pub(crate) fn attach_recompute(&self, id: &EntryId, recompute: Callback) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        let mut next = inner.state.clone();
        if !next.attach_recompute(id, recompute) {
            return Err(StoreError::not_found(id));
        }
        inner.state = next;
        Ok(())
    }

    pub(crate) fn downgrade(&self) -> WeakStore<V> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    fn run_change_pass(&self, pass: Vec<Callback>) {
        trace!(message = "store.notify", callbacks = pass.len());
        for cb in pass {
            cb.invoke();
        }
    }
}
