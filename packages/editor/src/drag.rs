//! # Drag Sessions
//!
//! Translates pointer and keyboard gestures into document mutations.
//!
//! ```text
//! Idle ──start──▶ Dragging ──end──▶ Idle   (at most one mutation)
//!                    │
//!                    └──cancel──▶ Idle     (no mutation)
//! ```
//!
//! `drag_over` only records the candidate target. Nothing reaches the
//! document until `end`.

use crate::document::DocumentStore;
use crate::errors::{DragError, EditorError};
use crate::mutations::{Mutation, MutationOutcome};
use pagewright_model::{ComponentInstance, SiblingScope};
use pagewright_registry::Registry;
use pagewright_store::DurableStore;
use serde::{Deserialize, Serialize};

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DragKind {
    /// A new component from the registry palette
    FromRegistry { registry_id: String },
    /// An existing instance
    Reorder { instance_id: String },
}

/// Candidate drop location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DropTarget {
    /// End of a page's root sequence
    Page { page_id: String },
    /// End of a container instance's children
    Container { instance_id: String },
    /// A final position inside a sibling scope
    Between { scope: SiblingScope, index: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        kind: DragKind,
        over: Option<DropTarget>,
        via_keyboard: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKey {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Committed(MutationOutcome),
    NoTarget,
    InvalidTarget(String),
    Cancelled,
}

#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn start_from_registry(&mut self, registry: &Registry, registry_id: &str) -> Result<(), DragError> {
        self.ensure_idle()?;
        if registry.get_by_id(registry_id).is_none() {
            return Err(DragError::UnknownComponent(registry_id.to_string()));
        }
        self.state = DragState::Dragging {
            kind: DragKind::FromRegistry {
                registry_id: registry_id.to_string(),
            },
            over: None,
            via_keyboard: false,
        };
        Ok(())
    }

    pub fn start_reorder<S: DurableStore>(
        &mut self,
        store: &DocumentStore<S>,
        instance_id: &str,
    ) -> Result<(), DragError> {
        self.ensure_idle()?;
        Self::draggable(store, instance_id)?;
        self.state = DragState::Dragging {
            kind: DragKind::Reorder {
                instance_id: instance_id.to_string(),
            },
            over: None,
            via_keyboard: false,
        };
        Ok(())
    }

    /// Keyboard pickup of a focused instance. The candidate starts at the
    /// instance's current position.
    pub fn start_keyboard<S: DurableStore>(
        &mut self,
        store: &DocumentStore<S>,
        instance_id: &str,
    ) -> Result<(), DragError> {
        self.ensure_idle()?;
        let instance = Self::draggable(store, instance_id)?;
        let index = store.state().index_in_scope(instance_id).unwrap_or(0);
        self.state = DragState::Dragging {
            kind: DragKind::Reorder {
                instance_id: instance_id.to_string(),
            },
            over: Some(DropTarget::Between {
                scope: instance.scope(),
                index,
            }),
            via_keyboard: true,
        };
        Ok(())
    }

    pub fn drag_over(&mut self, target: DropTarget) {
        if let DragState::Dragging { over, .. } = &mut self.state {
            *over = Some(target);
        }
    }

    pub fn cancel(&mut self) -> DragOutcome {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        if was_dragging {
            tracing::debug!("Drag cancelled");
        }
        DragOutcome::Cancelled
    }

    /// Arrow keys move the candidate among the current siblings; Enter drops
    /// and Escape cancels. Returns an outcome once the gesture is over.
    pub fn key<S: DurableStore>(
        &mut self,
        store: &mut DocumentStore<S>,
        key: DragKey,
    ) -> Result<Option<DragOutcome>, EditorError> {
        match key {
            DragKey::Enter => self.end(store).map(Some),
            DragKey::Escape => Ok(Some(self.cancel())),
            DragKey::Up | DragKey::Down => {
                if let DragState::Dragging {
                    over: Some(DropTarget::Between { scope, index }),
                    ..
                } = &mut self.state
                {
                    let len = store.siblings(scope).len();
                    *index = match key {
                        DragKey::Up => index.saturating_sub(1),
                        _ => (*index + 1).min(len.saturating_sub(1)),
                    };
                }
                Ok(None)
            }
        }
    }

    /// Drop on the recorded target, firing at most one mutation
    pub fn end<S: DurableStore>(
        &mut self,
        store: &mut DocumentStore<S>,
    ) -> Result<DragOutcome, EditorError> {
        let DragState::Dragging { kind, over, .. } = std::mem::take(&mut self.state) else {
            return Ok(DragOutcome::NoTarget);
        };
        let Some(target) = over else {
            return Ok(DragOutcome::NoTarget);
        };

        let mutation = match Self::resolve(store, &kind, &target) {
            Ok(mutation) => mutation,
            Err(reason) => {
                tracing::debug!("Dropped on invalid target {:?}: {}", target, reason);
                return Ok(DragOutcome::InvalidTarget(reason));
            }
        };

        let outcome = store.dispatch(mutation)?;
        Ok(DragOutcome::Committed(outcome))
    }

    fn ensure_idle(&self) -> Result<(), DragError> {
        if self.is_dragging() {
            Err(DragError::AlreadyDragging)
        } else {
            Ok(())
        }
    }

    fn draggable<'a, S: DurableStore>(
        store: &'a DocumentStore<S>,
        instance_id: &str,
    ) -> Result<&'a ComponentInstance, DragError> {
        let instance = store
            .get(instance_id)
            .ok_or_else(|| DragError::UnknownInstance(instance_id.to_string()))?;
        if instance.is_locked {
            return Err(DragError::NotPermitted(instance_id.to_string()));
        }
        Ok(instance)
    }

    /// Scope and final index a target refers to
    fn target_scope<S: DurableStore>(
        store: &DocumentStore<S>,
        target: &DropTarget,
    ) -> Result<(SiblingScope, usize), String> {
        match target {
            DropTarget::Page { page_id } => {
                if store.page(page_id).is_none() {
                    return Err(format!("page {} does not exist", page_id));
                }
                let scope = SiblingScope::page(page_id.clone());
                let len = store.siblings(&scope).len();
                Ok((scope, len))
            }
            DropTarget::Container { instance_id } => {
                let container = store
                    .get(instance_id)
                    .ok_or_else(|| format!("container {} does not exist", instance_id))?;
                let scope = SiblingScope::child_of(container.page_id.clone(), instance_id.clone());
                let len = store.siblings(&scope).len();
                Ok((scope, len))
            }
            DropTarget::Between { scope, index } => {
                if store.page(&scope.page_id).is_none() {
                    return Err(format!("page {} does not exist", scope.page_id));
                }
                if let Some(parent) = &scope.parent_id {
                    if store.get(parent).map(|p| &p.page_id) != Some(&scope.page_id) {
                        return Err(format!("container {} does not exist", parent));
                    }
                }
                Ok((scope.clone(), *index))
            }
        }
    }

    fn resolve<S: DurableStore>(
        store: &mut DocumentStore<S>,
        kind: &DragKind,
        target: &DropTarget,
    ) -> Result<Mutation, String> {
        let (scope, index) = Self::target_scope(store, target)?;

        match kind {
            DragKind::FromRegistry { registry_id } => {
                let entry = store
                    .registry()
                    .get_by_id(registry_id)
                    .ok_or_else(|| format!("component {} is no longer registered", registry_id))?;
                let props = Registry::default_props(entry);
                let source = entry.source.clone();

                let siblings = store.siblings(&scope);
                let order = match siblings.get(index) {
                    Some(at) => at.order,
                    None => siblings.last().map_or(0, |last| last.order + 1),
                };

                let mut instance = ComponentInstance::new(
                    store.next_instance_id(),
                    scope.page_id.clone(),
                    registry_id.clone(),
                    source,
                    order,
                )
                .with_props(props);
                instance.parent_id = scope.parent_id.clone();

                Ok(Mutation::AddInstance {
                    instance,
                    reindex: true,
                })
            }
            DragKind::Reorder { instance_id } => {
                let instance = store
                    .get(instance_id)
                    .ok_or_else(|| format!("instance {} no longer exists", instance_id))?;
                if let Some(parent) = &scope.parent_id {
                    if store.state().is_self_or_descendant(parent, instance_id) {
                        return Err(format!("{} cannot be dropped inside itself", instance_id));
                    }
                }

                if instance.scope() == scope {
                    let len = store.siblings(&scope).len();
                    let from_index = store.state().index_in_scope(instance_id).unwrap_or(0);
                    Ok(Mutation::Reorder {
                        scope,
                        from_index,
                        to_index: index.min(len.saturating_sub(1)),
                    })
                } else {
                    Ok(Mutation::MoveInstance {
                        id: instance_id.clone(),
                        scope,
                        index,
                    })
                }
            }
        }
    }
}
