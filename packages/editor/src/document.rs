//! # Document Store
//!
//! Owns one project's pages and instances and is the only path through
//! which they change.
//!
//! ## Lifecycle
//!
//! ```text
//! Mutation → plan → commit (memory) → persist (durable)
//!                                        ↓ failure
//!                                  pending batches → retry()
//! ```
//!
//! The in-memory state is never reverted after a durable failure. The batch
//! stays queued and is replayed, in order, ahead of the next write.

use crate::errors::EditorError;
use crate::mutations::{InstancePatch, Mutation, MutationOutcome};
use crate::state::DocumentState;
use crate::writes::{persist, WriteBatch};
use pagewright_common::IDGenerator;
use pagewright_model::{
    CmsCollection, CmsItem, CmsSnapshot, ComponentInstance, DesignSystem, Page, PageSnapshot,
    SiblingScope,
};
use pagewright_registry::Registry;
use pagewright_store::{to_record, Collection, DurableStore, MemoryStore, StoreResult, TxMode};
use std::sync::Arc;

pub struct DocumentStore<S: DurableStore = MemoryStore> {
    project_id: String,

    /// Current version number (increments on each applied mutation)
    pub version: u64,

    state: DocumentState,
    registry: Arc<Registry>,
    durable: S,

    /// Batches already committed in memory but not yet durable
    pending: Vec<WriteBatch>,

    ids: IDGenerator,
}

impl<S: DurableStore> DocumentStore<S> {
    /// Empty document over `durable`, without reading it
    pub fn new(project_id: impl Into<String>, registry: Arc<Registry>, durable: S) -> Self {
        let project_id = project_id.into();
        Self {
            ids: IDGenerator::new(&project_id),
            project_id,
            version: 0,
            state: DocumentState::new(),
            registry,
            durable,
            pending: Vec::new(),
        }
    }

    /// Read every page of `project_id` and their instances from `durable`
    pub fn load(
        project_id: impl Into<String>,
        registry: Arc<Registry>,
        durable: S,
    ) -> Result<Self, EditorError> {
        let mut store = Self::new(project_id, registry, durable);

        let reader: &dyn DurableStore = &store.durable;
        let pages: Vec<Page> = reader
            .where_field(Collection::Pages, "projectId")
            .equals_as(store.project_id.as_str())?;

        let mut instances = Vec::new();
        for page in &pages {
            let found: Vec<ComponentInstance> = reader
                .where_field(Collection::ComponentInstances, "pageId")
                .equals_as(page.id.as_str())?;
            for mut instance in found {
                match store.registry.get_by_id(&instance.registry_id) {
                    Some(entry) => instance.props = Registry::classify(entry, instance.props),
                    None => tracing::warn!(
                        "Instance {} references unknown component {}",
                        instance.id,
                        instance.registry_id
                    ),
                }
                instances.push(instance);
            }
        }

        tracing::info!(
            "Loaded project {}: {} page(s), {} instance(s)",
            store.project_id,
            pages.len(),
            instances.len()
        );
        store.state = DocumentState::from_parts(pages, instances);
        Ok(store)
    }

    /// Apply a mutation in memory, then persist its writes.
    ///
    /// On a durable failure the returned error is
    /// [`EditorError::Persistence`] and the change stays visible in memory.
    pub fn dispatch(&mut self, mutation: Mutation) -> Result<MutationOutcome, EditorError> {
        let outcome = mutation.apply(&mut self.state, &self.registry)?;
        if let MutationOutcome::Applied(batch) = &outcome {
            self.version += 1;
            self.pending.push(batch.clone());
            self.flush()?;
        }
        Ok(outcome)
    }

    /// Persist queued batches in the order they were produced
    pub fn retry(&mut self) -> Result<(), EditorError> {
        self.flush()
    }

    fn flush(&mut self) -> Result<(), EditorError> {
        while let Some(batch) = self.pending.first() {
            if let Err(err) = persist(batch, &mut self.durable) {
                tracing::warn!(
                    "Persisting {} write(s) failed, {} batch(es) pending: {}",
                    batch.len(),
                    self.pending.len(),
                    err
                );
                return Err(EditorError::Persistence(err));
            }
            self.pending.remove(0);
        }
        Ok(())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Fresh instance id unique within this document
    pub fn next_instance_id(&mut self) -> String {
        let state = &self.state;
        self.ids.new_unique_id(|id| state.contains(id))
    }

    pub fn add_instance(
        &mut self,
        instance: ComponentInstance,
        reindex: bool,
    ) -> Result<MutationOutcome, EditorError> {
        self.dispatch(Mutation::AddInstance { instance, reindex })
    }

    pub fn update_instance(
        &mut self,
        id: &str,
        patch: InstancePatch,
    ) -> Result<MutationOutcome, EditorError> {
        self.dispatch(Mutation::UpdateInstance {
            id: id.to_string(),
            patch,
        })
    }

    pub fn remove_instance(&mut self, id: &str) -> Result<MutationOutcome, EditorError> {
        self.dispatch(Mutation::RemoveInstance { id: id.to_string() })
    }

    pub fn reorder(
        &mut self,
        scope: SiblingScope,
        from_index: usize,
        to_index: usize,
    ) -> Result<MutationOutcome, EditorError> {
        self.dispatch(Mutation::Reorder {
            scope,
            from_index,
            to_index,
        })
    }

    pub fn move_instance(
        &mut self,
        id: &str,
        scope: SiblingScope,
        index: usize,
    ) -> Result<MutationOutcome, EditorError> {
        self.dispatch(Mutation::MoveInstance {
            id: id.to_string(),
            scope,
            index,
        })
    }

    /// Duplicate `id`, returning the copy's id when something was created
    pub fn duplicate(&mut self, id: &str) -> Result<Option<String>, EditorError> {
        let new_id = self.next_instance_id();
        let outcome = self.dispatch(Mutation::Duplicate {
            id: id.to_string(),
            new_id: new_id.clone(),
        })?;
        Ok(outcome.is_applied().then_some(new_id))
    }

    pub fn reindex(&mut self, scope: SiblingScope) -> Result<MutationOutcome, EditorError> {
        self.dispatch(Mutation::Reindex { scope })
    }

    pub fn add_page(&mut self, page: Page) -> Result<MutationOutcome, EditorError> {
        self.dispatch(Mutation::AddPage { page })
    }

    pub fn remove_page(&mut self, page_id: &str) -> Result<MutationOutcome, EditorError> {
        self.dispatch(Mutation::RemovePage {
            page_id: page_id.to_string(),
        })
    }

    /// Root-level instances of a page, sorted by `order`
    pub fn instances_for_page(&self, page_id: &str) -> Vec<&ComponentInstance> {
        self.state.siblings(&SiblingScope::page(page_id))
    }

    pub fn siblings(&self, scope: &SiblingScope) -> Vec<&ComponentInstance> {
        self.state.siblings(scope)
    }

    pub fn get(&self, id: &str) -> Option<&ComponentInstance> {
        self.state.instance(id)
    }

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.state.page(id)
    }

    pub fn page_by_slug(&self, slug: &str) -> Option<&Page> {
        self.state.pages().into_iter().find(|p| p.slug == slug)
    }

    pub fn pages(&self) -> Vec<&Page> {
        self.state.pages()
    }

    /// Point-in-time copy of a page for export
    pub fn snapshot(&self, page_id: &str) -> Result<PageSnapshot, EditorError> {
        let page = self
            .state
            .page(page_id)
            .ok_or_else(|| EditorError::PageNotFound(page_id.to_string()))?;
        let instances = self
            .state
            .render_order(page_id)
            .into_iter()
            .cloned()
            .collect();
        Ok(PageSnapshot::new(page.clone(), instances))
    }

    /// Snapshots of every page in page order
    pub fn snapshot_all(&self) -> Result<Vec<PageSnapshot>, EditorError> {
        self.state
            .pages()
            .iter()
            .map(|p| self.snapshot(&p.id))
            .collect()
    }

    /// The project's design system as stored, if any
    pub fn design_system(&self) -> Result<Option<DesignSystem>, EditorError> {
        let reader: &dyn DurableStore = &self.durable;
        let mut found: Vec<DesignSystem> = reader
            .where_field(Collection::DesignSystems, "projectId")
            .equals_as(self.project_id.as_str())?;
        Ok(found.pop())
    }

    /// Replace the project's design system wholesale
    pub fn replace_design_system(&mut self, design: &DesignSystem) -> Result<(), EditorError> {
        let record = to_record(design)?;
        let project_id = self.project_id.clone();
        self.durable.transaction(
            TxMode::ReadWrite,
            &[Collection::DesignSystems],
            &mut |tx: &mut dyn DurableStore| -> StoreResult<()> {
                let existing = tx
                    .where_field(Collection::DesignSystems, "projectId")
                    .equals(project_id.as_str())?;
                for old in existing {
                    if let Some(id) = old.get("id").and_then(|v| v.as_str()) {
                        tx.delete(Collection::DesignSystems, id)?;
                    }
                }
                tx.add(Collection::DesignSystems, record.clone())?;
                Ok(())
            },
        )?;
        tracing::info!("Replaced design system of project {}", self.project_id);
        Ok(())
    }

    /// Collections and items of this project
    pub fn cms_snapshot(&self) -> Result<CmsSnapshot, EditorError> {
        let reader: &dyn DurableStore = &self.durable;
        let collections: Vec<CmsCollection> = reader
            .where_field(Collection::CmsCollections, "projectId")
            .equals_as(self.project_id.as_str())?;

        let mut items = Vec::new();
        for collection in &collections {
            let found: Vec<CmsItem> = reader
                .where_field(Collection::CmsItems, "collectionId")
                .equals_as(collection.id.as_str())?;
            items.extend(found);
        }
        Ok(CmsSnapshot { collections, items })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    pub fn durable(&self) -> &S {
        &self.durable
    }

    pub fn durable_mut(&mut self) -> &mut S {
        &mut self.durable
    }
}
