//! Error type for store operations.

use thiserror::Error;

use crate::id::EntryId;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Failure of a store operation.
///
/// A failed operation leaves entries, change callbacks and subscriptions
/// exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No entry currently exists for the identifier.
    #[error("Item doesn't exist: {0}")]
    NotFound(EntryId),
}

impl StoreError {
    #[must_use]
    pub fn not_found(id: &EntryId) -> Self {
        Self::NotFound(id.clone())
    }

    /// The identifier the failed operation referred to.
    #[must_use]
    pub fn id(&self) -> &EntryId {
        match self {
            Self::NotFound(id) => id,
        }
    }
}
