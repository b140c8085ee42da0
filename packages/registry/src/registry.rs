use crate::entry::RegistryEntry;
use pagewright_common::{IssueCollector, ValidationError, ValidationIssue};
use pagewright_model::{PropMap, SourceFamily};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Duplicate registry id: {0}")]
    DuplicateId(String),

    #[error("Unknown registry id: {0}")]
    UnknownId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid registry catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only lookup table from component id to metadata
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
}

impl Registry {
    pub fn new(entries: Vec<RegistryEntry>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.id.clone(), i).is_some() {
                return Err(RegistryError::DuplicateId(entry.id.clone()));
            }
        }

        tracing::debug!("Registry loaded with {} entries", entries.len());
        Ok(Self { entries, index })
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let entries: Vec<RegistryEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&RegistryEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn require(&self, id: &str) -> Result<&RegistryEntry, RegistryError> {
        self.get_by_id(id)
            .ok_or_else(|| RegistryError::UnknownId(id.to_string()))
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn families(&self) -> BTreeSet<SourceFamily> {
        self.entries.iter().map(|e| e.source.clone()).collect()
    }

    pub fn entries_in(&self, family: &SourceFamily) -> impl Iterator<Item = &RegistryEntry> {
        let family = family.clone();
        self.entries.iter().filter(move |e| e.source == family)
    }

    /// Schema defaults for a freshly inserted instance
    pub fn default_props(entry: &RegistryEntry) -> PropMap {
        let mut props = PropMap::new();
        for field in &entry.prop_schema {
            if let Some(default) = &field.default {
                props.insert_declared(field.name.clone(), default.clone());
            }
        }
        props
    }

    /// Route values into the declared/extra buckets of `entry`'s schema
    pub fn classify(entry: &RegistryEntry, props: PropMap) -> PropMap {
        props.reclassify(|name| entry.declares(name))
    }

    /// Validate a complete prop map: types of every declared value and
    /// presence of required props. Reports every issue found.
    pub fn validate_props(entry: &RegistryEntry, props: &PropMap) -> Result<(), ValidationError> {
        let mut issues = IssueCollector::new();

        for field in &entry.prop_schema {
            let path = format!("props.{}", field.name);
            match props.get(&field.name) {
                Some(value) => {
                    if let Some(issue) = field.check(value, &path) {
                        issues.push(issue);
                    }
                }
                None if field.required => issues.push(ValidationIssue::missing(path)),
                None => {}
            }
        }

        issues.finish(())
    }

    /// Validate only the values present in a patch
    pub fn validate_patch(
        entry: &RegistryEntry,
        patch: &std::collections::BTreeMap<String, Value>,
    ) -> Result<(), ValidationError> {
        let mut issues = IssueCollector::new();

        for (name, value) in patch {
            if let Some(field) = entry.field(name) {
                if let Some(issue) = field.check(value, &format!("props.{}", name)) {
                    issues.push(issue);
                }
            }
        }

        issues.finish(())
    }
}
