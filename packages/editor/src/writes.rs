//! # Write Batches
//!
//! A mutation is planned against a read-only [`DocumentState`] and yields a
//! [`WriteBatch`]. The batch is then committed twice: synchronously to the
//! in-memory state and, afterwards, to the durable store.
//!
//! Every write is an upsert or a delete keyed by id, so replaying a batch
//! that already partly reached the store converges to the same result.

use crate::state::DocumentState;
use pagewright_model::{ComponentInstance, Page};
use pagewright_store::{to_record, Collection, DurableStore, Record, StoreResult, TxMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Write {
    PutInstance { instance: ComponentInstance },
    SetOrder { id: String, order: i64 },
    DeleteInstance { id: String },
    PutPage { page: Page },
    DeletePage { id: String },
}

impl Write {
    fn collection(&self) -> Collection {
        match self {
            Write::PutInstance { .. } | Write::SetOrder { .. } | Write::DeleteInstance { .. } => {
                Collection::ComponentInstances
            }
            Write::PutPage { .. } | Write::DeletePage { .. } => Collection::Pages,
        }
    }
}

/// Writes produced by one mutation; applied atomically
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch {
    pub writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, write: Write) {
        self.writes.push(write);
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Ids of instances whose order changes in this batch
    pub fn reordered(&self) -> Vec<&str> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                Write::SetOrder { id, .. } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<&str> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                Write::DeleteInstance { id } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    fn collections(&self) -> Vec<Collection> {
        let mut collections: Vec<Collection> = Vec::new();
        for write in &self.writes {
            let collection = write.collection();
            if !collections.contains(&collection) {
                collections.push(collection);
            }
        }
        collections
    }
}

impl DocumentState {
    /// Apply a planned batch to the in-memory arena
    pub fn commit(&mut self, batch: &WriteBatch) {
        for write in &batch.writes {
            match write {
                Write::PutInstance { instance } => {
                    self.instances.insert(instance.id.clone(), instance.clone());
                }
                Write::SetOrder { id, order } => {
                    if let Some(instance) = self.instances.get_mut(id) {
                        instance.order = *order;
                    }
                }
                Write::DeleteInstance { id } => {
                    self.instances.remove(id);
                }
                Write::PutPage { page } => {
                    self.pages.insert(page.id.clone(), page.clone());
                }
                Write::DeletePage { id } => {
                    self.pages.remove(id);
                }
            }
        }
    }
}

/// Send a batch to the durable store inside one read-write transaction
pub fn persist(batch: &WriteBatch, durable: &mut dyn DurableStore) -> StoreResult<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let records = batch
        .writes
        .iter()
        .map(|write| match write {
            Write::PutInstance { instance } => to_record(instance).map(Some),
            Write::PutPage { page } => to_record(page).map(Some),
            _ => Ok(None),
        })
        .collect::<StoreResult<Vec<Option<Record>>>>()?;

    let collections = batch.collections();
    durable.transaction(TxMode::ReadWrite, &collections, &mut |tx: &mut dyn DurableStore| {
        for (write, record) in batch.writes.iter().zip(&records) {
            match (write, record) {
                (Write::PutInstance { instance }, Some(record)) => {
                    // replace rather than merge so cleared optional fields disappear
                    tx.delete(Collection::ComponentInstances, &instance.id)?;
                    tx.add(Collection::ComponentInstances, record.clone())?;
                }
                (Write::PutPage { .. }, Some(record)) => {
                    tx.put(Collection::Pages, record.clone())?;
                }
                (Write::SetOrder { id, order }, _) => {
                    let mut fields = Record::new();
                    fields.insert("order".to_string(), Value::from(*order));
                    tx.update(Collection::ComponentInstances, id, fields)?;
                }
                (Write::DeleteInstance { id }, _) => {
                    tx.delete(Collection::ComponentInstances, id)?;
                }
                (Write::DeletePage { id }, _) => {
                    tx.delete(Collection::Pages, id)?;
                }
                _ => {}
            }
        }
        Ok(())
    })?;

    tracing::debug!(
        "Persisted {} write(s) across {:?}",
        batch.len(),
        collections
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_model::SourceFamily;
    use pagewright_store::MemoryStore;

    fn batch() -> WriteBatch {
        let mut batch = WriteBatch::new();
        batch.push(Write::PutPage {
            page: Page::new("home", "proj", "Home", "home", 0),
        });
        batch.push(Write::PutInstance {
            instance: ComponentInstance::new("a", "home", "hero", SourceFamily::from("shadcn"), 0),
        });
        batch.push(Write::SetOrder {
            id: "a".to_string(),
            order: 3,
        });
        batch
    }

    #[test]
    fn test_persist_is_repeatable() {
        let mut store = MemoryStore::new();
        let batch = batch();

        persist(&batch, &mut store).unwrap();
        persist(&batch, &mut store).unwrap();

        assert_eq!(store.len(Collection::Pages), 1);
        assert_eq!(store.len(Collection::ComponentInstances), 1);
        let record = store
            .get(Collection::ComponentInstances, "a")
            .unwrap()
            .unwrap();
        assert_eq!(record["order"], serde_json::json!(3));
    }

    #[test]
    fn test_commit_matches_persist() {
        let mut state = DocumentState::new();
        state.commit(&batch());
        assert_eq!(state.instance("a").unwrap().order, 3);
        assert!(state.page("home").is_some());
    }

    #[test]
    fn test_offline_store_leaves_nothing_behind() {
        let mut store = MemoryStore::new();
        store.set_available(false);
        assert!(persist(&batch(), &mut store).is_err());
        assert_eq!(store.len(Collection::ComponentInstances), 0);
    }
}
