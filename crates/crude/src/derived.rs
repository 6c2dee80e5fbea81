//! Derived entries: values computed from other entries.
//!
//! A derived entry is an ordinary entry plus a recompute callback subscribed
//! to its dependencies. Everything here goes through the store's public
//! operations except marking the entry as derived.
//!
//! # Recompute order
//!
//! When a dependency is updated its watchers run in subscription order, and
//! each recompute updates its own entry synchronously, which in turn runs
//! that entry's watchers before the next sibling. Chains therefore settle
//! depth first. There is no topological sort: in a diamond (`d` over `b` and
//! `c`, both over `a`) `d` is recomputed once per updated parent and may
//! briefly hold a value mixing the new `b` with the old `c`. Once the
//! outermost update returns, every derived value matches its current
//! dependencies.
//!
//! # Failure Modes
//!
//! - **Dependency deleted**: the recompute can no longer read all of its
//!   inputs. It leaves the derived value as last computed and logs
//!   `store.recompute_skipped`.
//! - **Compute panics**: the panic unwinds out of the mutation that
//!   triggered the recompute. No store borrow is held, so the store stays
//!   usable.

use tracing::{trace, warn};

use crate::callback::Callback;
use crate::error::Result;
use crate::id::EntryId;
use crate::store::{Store, WeakStore};

impl<V: Clone + 'static> Store<V> {
    /// Create an entry holding `compute(values of deps)` and keep it current.
    ///
    /// `compute` receives the dependency values positionally. It runs once
    /// now and again after every update to any dependency, always over the
    /// current values of all of them. Fails with `NotFound` if a dependency
    /// does not exist now.
    ///
    /// Once created, the entry cannot report errors to anyone: if a
    /// dependency is later deleted, each recompute that can no longer read it
    /// keeps the last computed value and logs `store.recompute_skipped` at
    /// warn level instead of returning `NotFound`.
    pub fn create_calculated<F>(&self, compute: F, deps: &[EntryId]) -> Result<EntryId>
    where
        F: Fn(&[V]) -> V + 'static,
    {
        let initial = compute(&self.read_many(deps)?);
        let id = self.create(initial);

        let recompute = recompute_callback(self.downgrade(), id.clone(), deps.to_vec(), compute);
        // A change callback may already have deleted the new entry.
        self.attach_recompute(&id, recompute.clone())?;
        self.subscribe(deps.iter().cloned(), &recompute);
        Ok(id)
    }
}

fn recompute_callback<V, F>(
    store: WeakStore<V>,
    target: EntryId,
    deps: Vec<EntryId>,
    compute: F,
) -> Callback
where
    V: Clone + 'static,
    F: Fn(&[V]) -> V + 'static,
{
    Callback::new(move || {
        let Some(store) = store.upgrade() else {
            return;
        };
        let values = match store.read_many(&deps) {
            Ok(values) => values,
            Err(err) => {
                warn!(
                    message = "store.recompute_skipped",
                    target = %target,
                    missing = %err.id()
                );
                return;
            }
        };
        trace!(message = "store.recompute", target = %target, deps = deps.len());
        if let Err(err) = store.update(&target, compute(&values)) {
            warn!(message = "store.recompute_skipped", target = %target, missing = %err.id());
        }
    })
}
