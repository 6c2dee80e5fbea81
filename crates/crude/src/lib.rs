#![forbid(unsafe_code)]

//! In-memory reactive key-value store.
//!
//! Values live under generated identifiers and are created, read, updated
//! and deleted through a [`Store`]. Observers hear about changes two ways:
//!
//! - change callbacks run after every successful mutation, whatever it
//!   touched;
//! - subscriptions run when one of the identifiers they watch is updated.
//!
//! Derived entries ([`Store::create_calculated`]) are built on
//! subscriptions: their value is a function of other entries and is
//! recomputed whenever one of those entries is updated.
//!
//! ```
//! use crude::{Callback, Store};
//!
//! let store: Store<i64> = Store::new();
//! let a = store.create(21);
//! let doubled = store.create_calculated(|v| v[0] * 2, &[a.clone()])?;
//! assert_eq!(store.read(&doubled)?, 42);
//!
//! store.add_change_callback(&Callback::new(|| println!("changed")));
//! store.update(&a, 42)?;
//! assert_eq!(store.read(&doubled)?, 84);
//! # Ok::<(), crude::StoreError>(())
//! ```
//!
//! The store is single-threaded and synchronous: every operation, including
//! all notification and recomputation it causes, finishes before it returns.

pub mod callback;
mod derived;
pub mod entry;
pub mod error;
pub mod id;
pub mod notifier;
pub mod store;
pub mod subscriptions;

pub use callback::Callback;
pub use entry::{Entry, Item, Snapshot};
pub use error::{Result, StoreError};
pub use id::{EntryId, IdSource, SequentialIds, UuidIds};
pub use store::Store;
