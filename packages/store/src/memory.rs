use crate::collection::{Collection, Record};
use crate::error::{StoreError, StoreResult};
use crate::store::{record_id, DurableStore, TxMode};
use serde_json::Value;
use std::collections::BTreeMap;

type Tables = BTreeMap<Collection, BTreeMap<String, Record>>;

/// In-memory store.
///
/// Used directly in tests and as the working set of [`crate::JsonFileStore`].
/// `set_available(false)` makes every write fail, which is how callers
/// exercise their persistence-failure paths.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Tables,
    available: bool,
    writes: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Tables::new(),
            available: true,
            writes: 0,
        }
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Number of successful write operations so far
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.tables.get(&collection).map(BTreeMap::len).unwrap_or(0)
    }

    pub fn all(&self, collection: Collection) -> Vec<Record> {
        self.tables
            .get(&collection)
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn tables(&self) -> &Tables {
        &self.tables
    }

    pub(crate) fn from_tables(tables: Tables) -> Self {
        Self {
            tables,
            available: true,
            writes: 0,
        }
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DurableStore for MemoryStore {
    fn add(&mut self, collection: Collection, record: Record) -> StoreResult<String> {
        self.check_writable()?;
        let id = record_id(collection, &record)?;
        let table = self.tables.entry(collection).or_default();
        if table.contains_key(&id) {
            return Err(StoreError::DuplicateId { collection, id });
        }
        table.insert(id.clone(), record);
        self.writes += 1;
        Ok(id)
    }

    fn update(&mut self, collection: Collection, id: &str, fields: Record) -> StoreResult<bool> {
        self.check_writable()?;
        let Some(record) = self.tables.get_mut(&collection).and_then(|t| t.get_mut(id)) else {
            return Ok(false);
        };
        for (key, value) in fields {
            if key != "id" {
                record.insert(key, value);
            }
        }
        self.writes += 1;
        Ok(true)
    }

    fn delete(&mut self, collection: Collection, id: &str) -> StoreResult<bool> {
        self.check_writable()?;
        let removed = self
            .tables
            .get_mut(&collection)
            .map(|t| t.remove(id).is_some())
            .unwrap_or(false);
        if removed {
            self.writes += 1;
        }
        Ok(removed)
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        Ok(self.tables.get(&collection).and_then(|t| t.get(id)).cloned())
    }

    fn find_equals(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Record>> {
        Ok(self
            .tables
            .get(&collection)
            .map(|t| {
                t.values()
                    .filter(|r| r.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn transaction(
        &mut self,
        mode: TxMode,
        collections: &[Collection],
        body: &mut dyn FnMut(&mut dyn DurableStore) -> StoreResult<()>,
    ) -> StoreResult<()> {
        if mode == TxMode::ReadWrite {
            self.check_writable()?;
        }

        let saved: Vec<(Collection, Option<BTreeMap<String, Record>>)> = collections
            .iter()
            .map(|c| (*c, self.tables.get(c).cloned()))
            .collect();
        let writes_before = self.writes;

        let result = {
            let mut scoped = ScopedTx {
                inner: self,
                mode,
                scope: collections,
            };
            body(&mut scoped)
        };

        if let Err(err) = result {
            tracing::debug!("Rolling back transaction over {:?}: {}", collections, err);
            for (collection, table) in saved {
                match table {
                    Some(table) => {
                        self.tables.insert(collection, table);
                    }
                    None => {
                        self.tables.remove(&collection);
                    }
                }
            }
            self.writes = writes_before;
            return Err(err);
        }

        Ok(())
    }
}

/// Transaction view that enforces mode and collection scope
struct ScopedTx<'a> {
    inner: &'a mut MemoryStore,
    mode: TxMode,
    scope: &'a [Collection],
}

impl ScopedTx<'_> {
    fn check(&self, collection: Collection, write: bool) -> StoreResult<()> {
        if !self.scope.contains(&collection) {
            return Err(StoreError::OutOfScope(collection));
        }
        if write && self.mode == TxMode::ReadOnly {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }
}

impl DurableStore for ScopedTx<'_> {
    fn add(&mut self, collection: Collection, record: Record) -> StoreResult<String> {
        self.check(collection, true)?;
        self.inner.add(collection, record)
    }

    fn update(&mut self, collection: Collection, id: &str, fields: Record) -> StoreResult<bool> {
        self.check(collection, true)?;
        self.inner.update(collection, id, fields)
    }

    fn delete(&mut self, collection: Collection, id: &str) -> StoreResult<bool> {
        self.check(collection, true)?;
        self.inner.delete(collection, id)
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        self.check(collection, false)?;
        self.inner.get(collection, id)
    }

    fn find_equals(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Record>> {
        self.check(collection, false)?;
        self.inner.find_equals(collection, field, value)
    }

    fn transaction(
        &mut self,
        mode: TxMode,
        collections: &[Collection],
        body: &mut dyn FnMut(&mut dyn DurableStore) -> StoreResult<()>,
    ) -> StoreResult<()> {
        // nested transactions join the outer one
        for collection in collections {
            self.check(*collection, mode == TxMode::ReadWrite)?;
        }
        body(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_crud() {
        let mut store = MemoryStore::new();
        let id = store
            .add(Collection::Pages, record(json!({"id": "p1", "name": "Home"})))
            .unwrap();
        assert_eq!(id, "p1");

        assert!(store
            .update(Collection::Pages, "p1", record(json!({"name": "Start"})))
            .unwrap());
        assert_eq!(
            store.get(Collection::Pages, "p1").unwrap().unwrap()["name"],
            json!("Start")
        );

        assert!(store.delete(Collection::Pages, "p1").unwrap());
        assert!(!store.delete(Collection::Pages, "p1").unwrap());
        assert!(!store
            .update(Collection::Pages, "p1", record(json!({"name": "x"})))
            .unwrap());
    }

    #[test]
    fn test_where_equals() {
        let mut store = MemoryStore::new();
        for (id, page) in [("a", "p1"), ("b", "p2"), ("c", "p1")] {
            store
                .add(
                    Collection::ComponentInstances,
                    record(json!({"id": id, "pageId": page})),
                )
                .unwrap();
        }

        let dyn_store: &dyn DurableStore = &store;
        let found = dyn_store
            .where_field(Collection::ComponentInstances, "pageId")
            .equals("p1")
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let mut store = MemoryStore::new();
        store
            .add(Collection::Pages, record(json!({"id": "p1"})))
            .unwrap();

        let result = store.transaction(
            TxMode::ReadWrite,
            &[Collection::Pages, Collection::ComponentInstances],
            &mut |tx: &mut dyn DurableStore| {
                tx.delete(Collection::Pages, "p1")?;
                tx.add(Collection::ComponentInstances, record(json!({"id": "i1"})))?;
                tx.add(Collection::Projects, record(json!({"id": "x"})))?;
                Ok(())
            },
        );

        assert!(matches!(result, Err(StoreError::OutOfScope(Collection::Projects))));
        assert_eq!(store.len(Collection::Pages), 1);
        assert_eq!(store.len(Collection::ComponentInstances), 0);
    }

    #[test]
    fn test_offline_store_rejects_writes() {
        let mut store = MemoryStore::new();
        store.set_available(false);
        let result = store.add(Collection::Pages, record(json!({"id": "p1"})));
        assert!(matches!(result, Err(StoreError::Unavailable(_))));

        store.set_available(true);
        assert!(store.add(Collection::Pages, record(json!({"id": "p1"}))).is_ok());
    }

    #[test]
    fn test_put_is_repeatable() {
        let mut store = MemoryStore::new();
        {
            let dyn_store: &mut dyn DurableStore = &mut store;
            dyn_store
                .put(Collection::Pages, record(json!({"id": "p1", "name": "Home"})))
                .unwrap();
            dyn_store
                .put(Collection::Pages, record(json!({"id": "p1", "name": "Home"})))
                .unwrap();
        }
        assert_eq!(store.len(Collection::Pages), 1);
    }
}
