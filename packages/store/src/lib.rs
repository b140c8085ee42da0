//! # Durable Store
//!
//! Collection-oriented persistence used behind the document store.
//!
//! The core only relies on a handful of primitives: `add`,
//! `update(id, partial)`, `delete(id)`, `where(field).equals(value)` and
//! multi-collection transactions. Records are JSON objects carrying a
//! string `id`.

mod collection;
mod error;
mod file;
mod memory;
mod store;

pub use collection::{Collection, Record};
pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{from_record, to_record, DurableStore, TxMode, WhereClause};
