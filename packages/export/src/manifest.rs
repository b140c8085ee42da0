use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFile {
    pub path: String,
    pub content: String,
}

/// Complete set of files for one export, plus the resolved package map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportManifest {
    pub files: Vec<ManifestFile>,
    pub dependencies: BTreeMap<String, String>,
}

impl ExportManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file unless one with the same path is already present.
    ///
    /// Returns whether the file was added.
    pub fn push(&mut self, path: impl Into<String>, content: impl Into<String>) -> bool {
        let path = path.into();
        if self.contains(&path) {
            tracing::debug!("Skipping duplicate manifest path {}", path);
            return false;
        }
        self.files.push(ManifestFile {
            path,
            content: content.into(),
        });
        true
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    pub fn file(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.content.as_str())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
