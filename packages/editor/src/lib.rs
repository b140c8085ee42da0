//! # Pagewright Editor
//!
//! Core document editing engine for Pagewright.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ registry: component catalog + prop schemas  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: page/instance arena + mutations     │
//! │  - Plan mutations against a read-only state │
//! │  - Commit in memory, then persist           │
//! │  - Drag sessions (pointer and keyboard)     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: durable collections + transactions   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagewright_editor::{DocumentStore, DragSession, DropTarget};
//!
//! let mut store = DocumentStore::load("proj", registry, durable)?;
//!
//! let mut drag = DragSession::new();
//! drag.start_from_registry(store.registry(), "shadcn-hero")?;
//! drag.drag_over(DropTarget::Page { page_id: "home".into() });
//! drag.end(&mut store)?;
//!
//! let snapshot = store.snapshot("home")?;
//! ```

mod document;
mod drag;
mod errors;
mod mutations;
mod state;
mod writes;

pub use document::DocumentStore;
pub use drag::{DragKey, DragKind, DragOutcome, DragSession, DragState, DropTarget};
pub use errors::{DragError, EditorError};
pub use mutations::{InstancePatch, Mutation, MutationError, MutationOutcome, Unchanged};
pub use state::{DocumentState, Placement};
pub use writes::{persist, Write, WriteBatch};
