//! # Pagewright Bindings
//!
//! Import external documents into a project without touching the store.
//!
//! - [`tokens`]: a brand/token export becomes a [`DesignSystem`] plus patches
//!   for `"{tokenName}"` props
//! - [`content`]: a marketing-copy document becomes prop patches for the
//!   sections it describes
//!
//! Both return [`PropPatch`] lists. Committing them is up to the caller, so a
//! dry run is simply not committing.
//!
//! [`DesignSystem`]: pagewright_model::DesignSystem

pub mod color;
pub mod content;
mod error;
pub mod placeholder;
pub mod tokens;

pub use content::{ContentBridge, ContentImport, ContentSection, PlaceholderCollision};
pub use error::{BindingError, BindingResult};
pub use placeholder::{placeholder_name, PropPatch};
pub use tokens::{DesignTokenBridge, TokenDocument, TokenImport};
