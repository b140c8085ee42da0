//! # Registry Index
//!
//! Static catalog of component kinds. Loaded once, never mutated at runtime.

mod dependency;
mod entry;
mod registry;
mod schema;

pub use dependency::PackageSpec;
pub use entry::{to_pascal_case, RegistryEntry, SourceLocator};
pub use registry::{Registry, RegistryError};
pub use schema::{PropField, PropType};
