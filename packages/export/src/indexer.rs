//! # Source Indexing
//!
//! Build-time pass that locates the source text behind every registry entry.
//!
//! For each entry, in order:
//! 0. an explicit `file:` path in its source locator
//! 1. `<componentsDir>/<family>/<id>.<ext>`
//! 2. the same with the `<family>-` prefix stripped from the id
//! 3. a fuzzy match: any file in the family directory whose name contains
//!    the slug or is contained by it
//!
//! Every module in the shared directories is captured as well, and local
//! imports are followed so the table is closed under import.
//!
//! A source that cannot be read only costs its own entry: the id lands in
//! [`SourceTable::failed`] and indexing carries on.

use crate::error::SourceIndexError;
use crate::imports::{local_candidates, package_name, scan_specifiers, MODULE_EXTENSIONS};
use crate::source_table::{ComponentSource, MatchKind, SourceModule, SourceTable};
use pagewright_common::FileSystem;
use pagewright_registry::{Registry, RegistryEntry};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SourceIndexOptions {
    /// Project root all other paths are relative to
    pub root: PathBuf,
    /// Directory holding one sub-directory per component family
    pub components_dir: String,
    /// Directories captured wholesale (UI primitives, helpers)
    pub shared_dirs: Vec<String>,
}

impl Default for SourceIndexOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            components_dir: "src/components".to_string(),
            shared_dirs: vec!["src/components/ui".to_string(), "src/lib".to_string()],
        }
    }
}

pub struct SourceIndexBuilder<'a> {
    fs: &'a dyn FileSystem,
    options: SourceIndexOptions,
    listings: BTreeMap<String, Vec<String>>,
}

impl<'a> SourceIndexBuilder<'a> {
    pub fn new(fs: &'a dyn FileSystem, options: SourceIndexOptions) -> Self {
        Self {
            fs,
            options,
            listings: BTreeMap::new(),
        }
    }

    pub fn build(mut self, registry: &Registry) -> Result<SourceTable, SourceIndexError> {
        let mut table = SourceTable::new();

        for entry in registry.entries() {
            let located = match self.locate(entry) {
                Ok(located) => located,
                Err(err) => {
                    tracing::warn!("Cannot search sources for {}: {}", entry.id, err);
                    table.failed.push(entry.id.clone());
                    continue;
                }
            };
            match located {
                Some((path, matched_by)) => {
                    tracing::debug!("{} -> {} ({:?})", entry.id, path, matched_by);
                    if let Err(err) = self.capture(&mut table, &path) {
                        tracing::warn!("Cannot read {} for {}: {}", path, entry.id, err);
                        table.failed.push(entry.id.clone());
                        continue;
                    }
                    table.components.insert(
                        entry.id.clone(),
                        ComponentSource {
                            module: path,
                            matched_by,
                        },
                    );
                }
                None => {
                    tracing::warn!("No source found for {} ({})", entry.id, entry.source);
                    table.unmatched.push(entry.id.clone());
                }
            }
        }

        for dir in self.options.shared_dirs.clone() {
            let files = match self.list(&dir) {
                Ok(files) => files,
                Err(err) => {
                    tracing::warn!("Cannot list shared directory {}: {}", dir, err);
                    continue;
                }
            };
            for path in files {
                if let Err(err) = self.capture(&mut table, &path) {
                    tracing::warn!("Skipping shared module {}: {}", path, err);
                }
            }
        }

        self.resolve_imports(&mut table);

        tracing::info!(
            "Indexed {} component(s), {} module(s), {} unmatched, {} unreadable",
            table.components.len(),
            table.modules.len(),
            table.unmatched.len(),
            table.failed.len()
        );
        Ok(table)
    }

    fn locate(&mut self, entry: &RegistryEntry) -> Result<Option<(String, MatchKind)>, SourceIndexError> {
        if let Some(explicit) = entry.source_locator.explicit_path() {
            let path = crate::imports::normalize(explicit);
            if self.fs.exists(&self.absolute(&path)) {
                return Ok(Some((path, MatchKind::Explicit)));
            }
            tracing::warn!("Explicit source {} for {} does not exist", explicit, entry.id);
        }

        let family_dir = format!("{}/{}", self.options.components_dir, entry.source);
        let candidates = self.list(&family_dir)?;

        for (stem, kind) in [
            (entry.id.as_str(), MatchKind::Exact),
            (entry.module_slug(), MatchKind::PrefixStripped),
        ] {
            for ext in MODULE_EXTENSIONS {
                let path = format!("{}/{}.{}", family_dir, stem, ext);
                if candidates.contains(&path) {
                    return Ok(Some((path, kind)));
                }
            }
        }

        Ok(fuzzy_match(entry.module_slug(), &candidates).map(|p| (p, MatchKind::Fuzzy)))
    }

    /// Module files directly inside `dir`, as table paths
    fn list(&mut self, dir: &str) -> Result<Vec<String>, SourceIndexError> {
        if let Some(cached) = self.listings.get(dir) {
            return Ok(cached.clone());
        }

        let mut files = Vec::new();
        for path in self.fs.list_files(&self.absolute(dir))? {
            let has_module_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| MODULE_EXTENSIONS.contains(&e));
            if has_module_ext {
                if let Some(relative) = self.relative(&path) {
                    files.push(relative);
                }
            }
        }
        self.listings.insert(dir.to_string(), files.clone());
        Ok(files)
    }

    fn capture(&self, table: &mut SourceTable, path: &str) -> Result<(), SourceIndexError> {
        if table.modules.contains_key(path) {
            return Ok(());
        }
        let text = self.fs.read_to_string(&self.absolute(path))?;
        table.modules.insert(
            path.to_string(),
            SourceModule {
                path: path.to_string(),
                text,
                imports: Default::default(),
            },
        );
        Ok(())
    }

    /// Record each module's imports, capturing local files not seen yet
    fn resolve_imports(&self, table: &mut SourceTable) {
        let mut queue: Vec<String> = table.modules.keys().cloned().collect();

        while let Some(path) = queue.pop() {
            let Some(text) = table.modules.get(&path).map(|m| m.text.clone()) else {
                continue;
            };

            let mut shared = Vec::new();
            let mut packages = Vec::new();
            for specifier in scan_specifiers(&text) {
                if let Some(candidates) = local_candidates(&specifier, &path) {
                    let found = match candidates.iter().find(|c| table.modules.contains_key(*c)) {
                        Some(hit) => Some(hit.clone()),
                        None => self.find_on_disk(&candidates),
                    };
                    match found {
                        Some(target) => {
                            if !table.modules.contains_key(&target) {
                                if let Err(err) = self.capture(table, &target) {
                                    tracing::warn!("{}: cannot read import {}: {}", path, target, err);
                                    continue;
                                }
                                queue.push(target.clone());
                            }
                            if !shared.contains(&target) {
                                shared.push(target);
                            }
                        }
                        None => tracing::debug!("{}: unresolved local import {}", path, specifier),
                    }
                } else if let Some(name) = package_name(&specifier) {
                    if !packages.contains(&name) {
                        packages.push(name);
                    }
                }
            }

            if let Some(module) = table.modules.get_mut(&path) {
                module.imports.shared = shared;
                module.imports.packages = packages;
            }
        }
    }

    fn find_on_disk(&self, candidates: &[String]) -> Option<String> {
        candidates
            .iter()
            .filter(|c| {
                Path::new(c.as_str())
                    .extension()
                    .and_then(|e| e.to_str())
                    .map_or(false, |e| MODULE_EXTENSIONS.contains(&e))
            })
            .find(|c| self.fs.exists(&self.absolute(c)))
            .cloned()
    }

    fn absolute(&self, relative: &str) -> PathBuf {
        self.options.root.join(relative)
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.options.root).ok()?;
        Some(relative.to_string_lossy().replace('\\', "/"))
    }
}

/// Run the indexing pass on a blocking thread
pub async fn index_sources_async<F: FileSystem + Send + 'static>(
    fs: F,
    options: SourceIndexOptions,
    registry: Registry,
) -> Result<SourceTable, SourceIndexError> {
    tokio::task::spawn_blocking(move || SourceIndexBuilder::new(&fs, options).build(&registry))
        .await
        .map_err(|e| SourceIndexError::Task(e.to_string()))?
}

fn simplify(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Best file whose stem contains `slug` or is contained in it.
///
/// Closest length wins; ties go to the lexically first path.
fn fuzzy_match(slug: &str, candidates: &[String]) -> Option<String> {
    let wanted = simplify(slug);
    if wanted.is_empty() {
        return None;
    }

    candidates
        .iter()
        .filter_map(|path| {
            let stem = Path::new(path).file_stem()?.to_str()?;
            let stem = simplify(stem);
            if stem.is_empty() || !(stem.contains(&wanted) || wanted.contains(&stem)) {
                return None;
            }
            Some((stem.len().abs_diff(wanted.len()), path))
        })
        .min()
        .map(|(_, path)| path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_prefers_closest_length() {
        let candidates = vec![
            "src/components/magicui/animated-hero-section.tsx".to_string(),
            "src/components/magicui/hero-section.tsx".to_string(),
            "src/components/magicui/footer.tsx".to_string(),
        ];
        assert_eq!(
            fuzzy_match("hero", &candidates).as_deref(),
            Some("src/components/magicui/hero-section.tsx")
        );
        assert_eq!(
            fuzzy_match("hero-section-v2", &candidates).as_deref(),
            Some("src/components/magicui/hero-section.tsx")
        );
        assert_eq!(fuzzy_match("pricing", &candidates), None);
    }
}
