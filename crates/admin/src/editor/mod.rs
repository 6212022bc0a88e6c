//! Stateful content editors.
//!
//! Each editor owns a local copy of remote rows plus the form the admin is
//! filling in, and re-reads the store after every write.

pub mod collection;
pub mod section;

use thiserror::Error;

use landing_cms_core::{OrderedEntity, OrderingError, ValidationError};

use crate::store::StoreError;

pub use collection::{EditorMode, OrderedCollectionEditor, ReorderOutcome};
pub use section::SectionEditor;

/// Errors from editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Form or payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Drag indices do not address the list.
    #[error(transparent)]
    Ordering(#[from] OrderingError),

    /// Id is not in the loaded list.
    #[error("{kind} {id} not found")]
    UnknownId { kind: &'static str, id: String },

    /// Submit while nothing is being created or edited.
    #[error("nothing is being edited")]
    NotEditing,

    /// Caller's view of the list no longer matches the store.
    #[error("{kind} at index {index} is no longer {expected}; reload and try again")]
    StaleOrder {
        kind: &'static str,
        index: usize,
        expected: String,
    },

    /// Writing the new order failed; the list was re-read from the store.
    #[error("failed to save new order: {0}")]
    Reorder(#[source] StoreError),

    /// Store read or write failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EditorError {
    pub(crate) fn unknown_id<E: OrderedEntity>(id: E::Id) -> Self {
        Self::UnknownId {
            kind: E::KIND,
            id: id.to_string(),
        }
    }
}
