//! # Source Table
//!
//! Output of the build-time indexing pass: which module implements each
//! registry entry, the text of every captured module, and what each module
//! imports. Serialized to JSON so export never touches the component tree.

use crate::error::SourceIndexError;
use crate::imports::ModuleImports;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// How a registry entry was matched to its module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    Explicit,
    Exact,
    PrefixStripped,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceModule {
    pub path: String,
    pub text: String,
    #[serde(default)]
    pub imports: ModuleImports,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSource {
    pub module: String,
    pub matched_by: MatchKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTable {
    /// registry id → module path
    pub components: BTreeMap<String, ComponentSource>,
    /// module path → captured module
    pub modules: BTreeMap<String, SourceModule>,
    /// Registry ids with no matching source
    #[serde(default)]
    pub unmatched: Vec<String>,
    /// Registry ids whose source was found but could not be read
    #[serde(default)]
    pub failed: Vec<String>,
}

impl SourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, SourceIndexError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SourceIndexError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn module(&self, path: &str) -> Option<&SourceModule> {
        self.modules.get(path)
    }

    /// Module implementing `registry_id`
    pub fn component(&self, registry_id: &str) -> Option<&SourceModule> {
        self.components
            .get(registry_id)
            .and_then(|c| self.modules.get(&c.module))
    }

    pub fn is_component_module(&self, path: &str) -> bool {
        self.components.values().any(|c| c.module == path)
    }

    /// Every captured module reachable from `roots` through local imports,
    /// excluding the roots themselves
    pub fn shared_closure<'a>(&self, roots: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        let roots: Vec<&str> = roots.into_iter().collect();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut stack: Vec<String> = roots
            .iter()
            .filter_map(|r| self.modules.get(*r))
            .flat_map(|m| m.imports.shared.iter().cloned())
            .collect();

        while let Some(path) = stack.pop() {
            if roots.contains(&path.as_str()) || !seen.insert(path.clone()) {
                continue;
            }
            if let Some(module) = self.modules.get(&path) {
                stack.extend(module.imports.shared.iter().cloned());
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(path: &str, shared: &[&str]) -> SourceModule {
        SourceModule {
            path: path.to_string(),
            text: String::new(),
            imports: ModuleImports {
                shared: shared.iter().map(|s| s.to_string()).collect(),
                packages: Vec::new(),
            },
        }
    }

    #[test]
    fn test_shared_closure_is_transitive() {
        let mut table = SourceTable::new();
        for m in [
            module("src/components/shadcn/hero.tsx", &["src/components/ui/button.tsx"]),
            module("src/components/ui/button.tsx", &["src/lib/utils.ts"]),
            module("src/lib/utils.ts", &[]),
            module("src/components/ui/unused.tsx", &[]),
        ] {
            table.modules.insert(m.path.clone(), m);
        }

        let closure = table.shared_closure(["src/components/shadcn/hero.tsx"]);
        assert_eq!(
            closure.into_iter().collect::<Vec<_>>(),
            vec!["src/components/ui/button.tsx", "src/lib/utils.ts"]
        );
    }

    #[test]
    fn test_closure_tolerates_cycles() {
        let mut table = SourceTable::new();
        for m in [
            module("a.ts", &["b.ts"]),
            module("b.ts", &["a.ts", "c.ts"]),
            module("c.ts", &["b.ts"]),
        ] {
            table.modules.insert(m.path.clone(), m);
        }
        assert_eq!(table.shared_closure(["a.ts"]).len(), 2);
    }
}
