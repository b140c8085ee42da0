use crate::collection::{Collection, Record};
use crate::error::StoreResult;
use crate::memory::MemoryStore;
use crate::store::{DurableStore, TxMode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Single JSON file holding every collection.
///
/// The whole file is rewritten after each successful top-level write or
/// transaction. Meant for the CLI and local projects, not concurrent writers.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl JsonFileStore {
    /// Open `path`, starting empty if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let memory = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let raw: BTreeMap<String, BTreeMap<String, Record>> = serde_json::from_str(&content)?;
            let mut tables = BTreeMap::new();
            for (name, records) in raw {
                match name.parse::<Collection>() {
                    Ok(collection) => {
                        tables.insert(collection, records);
                    }
                    Err(e) => tracing::warn!("Ignoring stored data: {}", e),
                }
            }
            MemoryStore::from_tables(tables)
        } else {
            MemoryStore::new()
        };

        tracing::debug!("Opened store at {}", path.display());
        Ok(Self { path, memory })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> StoreResult<()> {
        let raw: BTreeMap<&str, &BTreeMap<String, Record>> = self
            .memory
            .tables()
            .iter()
            .map(|(c, records)| (c.as_str(), records))
            .collect();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&raw)?)?;
        Ok(())
    }
}

impl DurableStore for JsonFileStore {
    fn add(&mut self, collection: Collection, record: Record) -> StoreResult<String> {
        let id = self.memory.add(collection, record)?;
        self.flush()?;
        Ok(id)
    }

    fn update(&mut self, collection: Collection, id: &str, fields: Record) -> StoreResult<bool> {
        let updated = self.memory.update(collection, id, fields)?;
        if updated {
            self.flush()?;
        }
        Ok(updated)
    }

    fn delete(&mut self, collection: Collection, id: &str) -> StoreResult<bool> {
        let deleted = self.memory.delete(collection, id)?;
        if deleted {
            self.flush()?;
        }
        Ok(deleted)
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        self.memory.get(collection, id)
    }

    fn find_equals(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Record>> {
        self.memory.find_equals(collection, field, value)
    }

    fn transaction(
        &mut self,
        mode: TxMode,
        collections: &[Collection],
        body: &mut dyn FnMut(&mut dyn DurableStore) -> StoreResult<()>,
    ) -> StoreResult<()> {
        self.memory.transaction(mode, collections, body)?;
        if mode == TxMode::ReadWrite {
            self.flush()?;
        }
        Ok(())
    }
}
