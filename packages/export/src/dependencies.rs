use pagewright_registry::PackageSpec;
use std::collections::BTreeMap;

/// Version used when neither the entry nor the version table pins one
pub const UNPINNED: &str = "latest";

/// Packages every generated project needs regardless of its components
pub const BASELINE: [(&str, &str); 2] = [("react", "^18.2.0"), ("react-dom", "^18.2.0")];

/// Deduplicated `name → version` map.
///
/// The first version seen for a name wins; later disagreeing versions are
/// logged and dropped.
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    versions: BTreeMap<String, String>,
    table: BTreeMap<String, String>,
}

impl DependencySet {
    /// `table` supplies versions for packages referenced without one
    pub fn new(table: BTreeMap<String, String>) -> Self {
        Self {
            versions: BTreeMap::new(),
            table,
        }
    }

    pub fn with_baseline(mut self) -> Self {
        for (name, version) in BASELINE {
            self.add(&PackageSpec {
                name: name.to_string(),
                version: Some(version.to_string()),
            });
        }
        self
    }

    pub fn add(&mut self, spec: &PackageSpec) {
        let version = spec
            .version
            .clone()
            .or_else(|| self.table.get(&spec.name).cloned())
            .unwrap_or_else(|| UNPINNED.to_string());

        match self.versions.get(&spec.name) {
            None => {
                self.versions.insert(spec.name.clone(), version);
            }
            Some(existing) if *existing != version && spec.version.is_some() => {
                tracing::warn!(
                    "Conflicting versions for {}: keeping {}, ignoring {}",
                    spec.name,
                    existing,
                    version
                );
            }
            Some(_) => {}
        }
    }

    /// Add a bare package name found by import scanning
    pub fn add_name(&mut self, name: &str) {
        self.add(&PackageSpec {
            name: name.to_string(),
            version: None,
        });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.versions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.versions
    }
}
