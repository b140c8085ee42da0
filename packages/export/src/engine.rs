//! # Manifest Assembly
//!
//! Request-time half of export. Takes page snapshots, the active design
//! system and a CMS snapshot, and produces every file of a standalone
//! project. Nothing is written back to the document and nothing partial is
//! returned: any problem aborts the export with the full list. Missing
//! sources do not stop the other checks, so they are reported together.

use crate::codegen::{self, ComponentRef, PageTarget};
use crate::dependencies::DependencySet;
use crate::error::{ExportError, ExportProblem, MissingSource};
use crate::manifest::ExportManifest;
use crate::source_table::SourceTable;
use crate::tokens::{substitute_tokens, substitute_value, tokens_css};
use pagewright_model::{BindingTarget, CmsSnapshot, ComponentInstance, DesignSystem, PageSnapshot};
use pagewright_registry::{Registry, RegistryEntry};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Leave hidden instances out of dependency and source collection too
    pub exclude_hidden: bool,
    /// Versions for packages referenced without one
    pub package_versions: BTreeMap<String, String>,
    pub project_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            exclude_hidden: false,
            package_versions: BTreeMap::new(),
            project_name: "Pagewright Site".to_string(),
        }
    }
}

/// Shared flag checked between instances; cancelling aborts the export
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ExportError> {
        if self.is_cancelled() {
            tracing::info!("Export cancelled");
            return Err(ExportError::Cancelled);
        }
        Ok(())
    }
}

/// Components used by an export, in first-use order
struct Resolved<'a> {
    entries: Vec<&'a RegistryEntry>,
    modules: Vec<&'a str>,
}

pub struct ExportEngine<'a> {
    registry: &'a Registry,
    table: &'a SourceTable,
    options: ExportOptions,
}

impl<'a> ExportEngine<'a> {
    pub fn new(registry: &'a Registry, table: &'a SourceTable, options: ExportOptions) -> Self {
        Self {
            registry,
            table,
            options,
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn export_page(
        &self,
        page: &PageSnapshot,
        design: &DesignSystem,
        cms: &CmsSnapshot,
        cancel: &CancellationToken,
    ) -> Result<ExportManifest, ExportError> {
        self.export_project(std::slice::from_ref(page), design, cms, cancel)
    }

    /// Export several pages as one project with a router
    pub fn export_project(
        &self,
        pages: &[PageSnapshot],
        design: &DesignSystem,
        cms: &CmsSnapshot,
        cancel: &CancellationToken,
    ) -> Result<ExportManifest, ExportError> {
        if pages.is_empty() {
            return Err(ExportError::NoPages);
        }

        let (resolved, missing) = self.resolve(pages, cancel)?;

        let closure = self.table.shared_closure(resolved.modules.iter().copied());
        let emitted: Vec<&str> = resolved
            .modules
            .iter()
            .copied()
            .chain(closure.iter().map(String::as_str).filter(|p| !resolved.modules.contains(p)))
            .collect();

        let mut deps = DependencySet::new(self.options.package_versions.clone()).with_baseline();
        for entry in &resolved.entries {
            for spec in entry.packages() {
                deps.add(&spec);
            }
        }
        for path in &emitted {
            if let Some(module) = self.table.module(path) {
                for name in &module.imports.packages {
                    deps.add_name(name);
                }
            }
        }

        let mut manifest = ExportManifest::new();
        let mut problems = Vec::new();

        for path in &emitted {
            if let Some(module) = self.table.module(path) {
                let text = substitute_tokens(&module.text, path, design, &mut problems);
                manifest.push(*path, text);
            }
        }

        let components: BTreeMap<String, ComponentRef> = resolved
            .entries
            .iter()
            .zip(&resolved.modules)
            .map(|(entry, module)| {
                (
                    entry.id.clone(),
                    ComponentRef {
                        export_name: entry.export_name(),
                        module_path: module.to_string(),
                    },
                )
            })
            .collect();

        let targets = page_targets(pages);
        for (snapshot, target) in pages.iter().zip(&targets) {
            let visible = snapshot.visible();
            let overrides = self.bind_cms(&visible, cms, &mut problems, cancel)?;

            let mut data = codegen::page_data(target, &snapshot.page, &visible, &overrides);
            substitute_value(&mut data, &target.data_path, design, &mut problems);
            manifest.push(target.data_path.clone(), serde_json::to_string_pretty(&data)?);

            let module = codegen::page_module(target, &visible, &components);
            let module = substitute_tokens(&module, &target.module_path, design, &mut problems);
            manifest.push(target.module_path.clone(), module);
        }

        if !missing.is_empty() {
            tracing::warn!(
                "Export aborted: {} instance(s) have no source, {} other problem(s)",
                missing.len(),
                problems.len()
            );
            return Err(ExportError::MissingSource { missing, problems });
        }
        if !problems.is_empty() {
            tracing::warn!("Export aborted with {} problem(s)", problems.len());
            return Err(ExportError::Problems(problems));
        }

        manifest.push(codegen::MAIN_PATH, codegen::main_module(&targets));
        if targets.len() > 1 {
            manifest.push(codegen::ROUTER_PATH, codegen::router_module(&targets));
        }
        manifest.push(codegen::TOKENS_CSS_PATH, tokens_css(design));
        manifest.push("index.html", codegen::index_html(&self.options.project_name));
        manifest.push("vite.config.ts", codegen::vite_config());
        manifest.push("tsconfig.json", serde_json::to_string_pretty(&codegen::tsconfig())?);

        let dependencies = deps.into_map();
        let package = codegen::package_json(&self.options.project_name, &dependencies);
        manifest.push("package.json", serde_json::to_string_pretty(&package)?);
        manifest.dependencies = dependencies;

        tracing::info!(
            "Exported {} page(s): {} component(s), {} shared module(s), {} file(s), {} package(s)",
            pages.len(),
            resolved.entries.len(),
            emitted.len() - resolved.modules.len(),
            manifest.len(),
            manifest.dependencies.len()
        );
        Ok(manifest)
    }

    /// Map every contributing instance to its entry and module. Misses are
    /// returned alongside so the rest of the export can still be checked.
    fn resolve(
        &self,
        pages: &[PageSnapshot],
        cancel: &CancellationToken,
    ) -> Result<(Resolved<'a>, Vec<MissingSource>), ExportError> {
        let mut resolved = Resolved {
            entries: Vec::new(),
            modules: Vec::new(),
        };
        let mut missing = Vec::new();

        for snapshot in pages {
            let contributing: Vec<&ComponentInstance> = if self.options.exclude_hidden {
                snapshot.visible()
            } else {
                snapshot.instances.iter().collect()
            };

            for instance in contributing {
                cancel.check()?;

                let entry = self.registry.get_by_id(&instance.registry_id);
                let module = self.table.component(&instance.registry_id);
                match (entry, module) {
                    (Some(entry), Some(module)) => {
                        if !resolved.entries.iter().any(|e| e.id == entry.id) {
                            tracing::debug!("{} -> {}", entry.id, module.path);
                            resolved.entries.push(entry);
                            resolved.modules.push(module.path.as_str());
                        }
                    }
                    _ => missing.push(MissingSource {
                        instance_id: instance.id.clone(),
                        registry_id: instance.registry_id.clone(),
                    }),
                }
            }
        }

        for miss in &missing {
            tracing::debug!("No source for {} ({})", miss.instance_id, miss.registry_id);
        }
        Ok((resolved, missing))
    }

    /// Current CMS values per instance, shaped as `{props: {..}, style: {..}}`
    fn bind_cms(
        &self,
        visible: &[&ComponentInstance],
        cms: &CmsSnapshot,
        problems: &mut Vec<ExportProblem>,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<String, Value>, ExportError> {
        let mut overrides: BTreeMap<String, Value> = BTreeMap::new();
        for instance in visible {
            cancel.check()?;
            for binding in &instance.cms_bindings {
                match cms.resolve(binding) {
                    Ok(value) => {
                        let slot = overrides
                            .entry(instance.id.clone())
                            .or_insert_with(|| Value::Object(Default::default()));
                        let section = match binding.target_type {
                            BindingTarget::Prop => "props",
                            BindingTarget::Style => "style",
                        };
                        slot[section][binding.target_key.as_str()] = value.clone();
                    }
                    Err(err) => problems.push(ExportProblem::UnresolvedBinding {
                        instance_id: instance.id.clone(),
                        field_slug: binding.field_slug.clone(),
                        reason: err.to_string(),
                    }),
                }
            }
        }
        Ok(overrides)
    }
}

/// One target per page; pages whose names collide get a numeric suffix
fn page_targets(pages: &[PageSnapshot]) -> Vec<PageTarget> {
    let mut taken: BTreeSet<String> = BTreeSet::new();
    let mut targets = Vec::with_capacity(pages.len());
    for snapshot in pages {
        let mut target = PageTarget::for_page(&snapshot.page);
        if !taken.insert(target.component_name.clone()) {
            let base = target.component_name.trim_end_matches("Page").to_string();
            let mut n = 2;
            while taken.contains(&format!("{}{}Page", base, n)) {
                n += 1;
            }
            target.component_name = format!("{}{}Page", base, n);
            target.module_path = format!("src/pages/{}.tsx", target.component_name);
            target.data_path = target.data_path.replace(".json", &format!("-{}.json", n));
            taken.insert(target.component_name.clone());
        }
        targets.push(target);
    }
    targets
}
