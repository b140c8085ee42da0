use crate::collection::{Collection, Record};
use crate::error::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    ReadOnly,
    ReadWrite,
}

/// Minimal persistence contract the core depends on.
///
/// Implementations decide the storage technology. Writes inside
/// [`DurableStore::transaction`] are all-or-nothing.
pub trait DurableStore {
    /// Insert a new record, returning its id
    fn add(&mut self, collection: Collection, record: Record) -> StoreResult<String>;

    /// Shallow-merge `fields` into an existing record. `Ok(false)` if absent.
    fn update(&mut self, collection: Collection, id: &str, fields: Record) -> StoreResult<bool>;

    /// Remove a record. `Ok(false)` if it was already gone.
    fn delete(&mut self, collection: Collection, id: &str) -> StoreResult<bool>;

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>>;

    /// Records whose `field` equals `value`
    fn find_equals(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Record>>;

    /// Run `body` against a view limited to `collections`
    fn transaction(
        &mut self,
        mode: TxMode,
        collections: &[Collection],
        body: &mut dyn FnMut(&mut dyn DurableStore) -> StoreResult<()>,
    ) -> StoreResult<()>;
}

/// `where(field).equals(value)` query builder
pub struct WhereClause<'a> {
    store: &'a dyn DurableStore,
    collection: Collection,
    field: &'a str,
}

impl<'a> WhereClause<'a> {
    pub fn equals(self, value: impl Into<Value>) -> StoreResult<Vec<Record>> {
        self.store
            .find_equals(self.collection, self.field, &value.into())
    }

    /// Same query, deserialized into typed records
    pub fn equals_as<T: DeserializeOwned>(self, value: impl Into<Value>) -> StoreResult<Vec<T>> {
        self.equals(value)?
            .into_iter()
            .map(from_record)
            .collect()
    }
}

impl<'s> dyn DurableStore + 's {
    pub fn where_field<'a>(&'a self, collection: Collection, field: &'a str) -> WhereClause<'a> {
        WhereClause {
            store: self,
            collection,
            field,
        }
    }

    /// Insert when absent, otherwise overwrite the stored fields.
    ///
    /// Safe to repeat: applying the same record twice leaves one copy.
    pub fn put(&mut self, collection: Collection, record: Record) -> StoreResult<()> {
        let id = record_id(collection, &record)?;
        if self.get(collection, &id)?.is_some() {
            self.update(collection, &id, record)?;
        } else {
            self.add(collection, record)?;
        }
        Ok(())
    }
}

pub(crate) fn record_id(collection: Collection, record: &Record) -> StoreResult<String> {
    record
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(StoreError::MissingId(collection))
}

pub fn to_record<T: Serialize>(value: &T) -> StoreResult<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Json(serde::ser::Error::custom(format!(
            "expected an object, got {}",
            other
        )))),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}
