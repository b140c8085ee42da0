//! Error types for the editor

use pagewright_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    /// The in-memory state already reflects the change; the failed batch is
    /// kept for [`crate::DocumentStore::retry`].
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Page not found: {0}")]
    PageNotFound(String),
}

/// Drag gestures rejected before any state changes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    #[error("A drag is already in progress")]
    AlreadyDragging,

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Unknown instance: {0}")]
    UnknownInstance(String),

    #[error("Instance is locked: {0}")]
    NotPermitted(String),
}
