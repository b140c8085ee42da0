use crate::config::Config;
use anyhow::{anyhow, Result};
use pagewright_editor::DocumentStore;
use pagewright_export::{ExportOptions, SourceIndexOptions, SourceTable};
use pagewright_model::ComponentInstance;
use pagewright_registry::Registry;
use pagewright_store::JsonFileStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// A project directory and its configuration
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    pub fn open(cwd: &Path) -> Result<Self> {
        Ok(Self {
            root: cwd.to_path_buf(),
            config: Config::load(cwd)?,
        })
    }

    pub fn registry(&self) -> Result<Arc<Registry>> {
        let path = self.config.registry_path(&self.root);
        let registry = Registry::load(&path)
            .map_err(|e| anyhow!("Cannot load registry {}: {}", path.display(), e))?;
        Ok(Arc::new(registry))
    }

    pub fn source_table(&self) -> Result<SourceTable> {
        let path = self.config.source_table_path(&self.root);
        if !path.exists() {
            return Err(anyhow!(
                "No source table at {}. Run: pagewright index",
                path.display()
            ));
        }
        Ok(SourceTable::load(&path)?)
    }

    pub fn document(&self, registry: Arc<Registry>) -> Result<DocumentStore<JsonFileStore>> {
        let durable = JsonFileStore::open(self.config.data_path(&self.root))?;
        Ok(DocumentStore::load(
            self.config.project_id.clone(),
            registry,
            durable,
        )?)
    }

    /// Configured shared directories plus every directory below them
    pub fn index_options(&self) -> SourceIndexOptions {
        let mut shared_dirs = Vec::new();
        for dir in &self.config.shared_dirs {
            let base = self.root.join(dir);
            for entry in WalkDir::new(&base)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_dir())
            {
                let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                    continue;
                };
                let relative = relative.to_string_lossy().replace('\\', "/");
                if !shared_dirs.contains(&relative) {
                    shared_dirs.push(relative);
                }
            }
        }

        SourceIndexOptions {
            root: self.root.clone(),
            components_dir: self.config.components_dir.clone(),
            shared_dirs,
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            exclude_hidden: self.config.exclude_hidden,
            package_versions: self.config.package_versions.clone(),
            project_name: self.config.project_name.clone(),
        }
    }
}

/// Every instance of every page, owned so the store can be mutated after
pub fn all_instances<S: pagewright_store::DurableStore>(
    document: &DocumentStore<S>,
) -> Vec<ComponentInstance> {
    document
        .pages()
        .iter()
        .flat_map(|page| document.instances_for_page(&page.id))
        .cloned()
        .collect()
}
