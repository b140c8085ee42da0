//! # Pagewright Document Model
//!
//! Plain data shared by the store, editor, binding resolvers and export
//! engine. Nothing here performs I/O.
//!
//! Instances are kept in a flat arena keyed by id. Nesting is expressed
//! relationally through `parent_id` and `order`, never by owning children.

pub mod cms;
pub mod design;
pub mod instance;
pub mod page;
pub mod props;
pub mod snapshot;

pub use cms::{CmsCollection, CmsField, CmsItem, CmsLookupError, CmsSnapshot};
pub use design::{DesignSystem, TokenGroup};
pub use instance::{
    BindingTarget, CmsBinding, ComponentInstance, SiblingScope, SourceFamily, StyleMap,
};
pub use page::{Page, Project};
pub use props::PropMap;
pub use snapshot::PageSnapshot;
