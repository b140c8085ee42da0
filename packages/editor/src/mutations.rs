//! # Document Mutations
//!
//! Semantic operations on a project's page/instance arena.
//!
//! Every mutation is planned against the current [`DocumentState`] without
//! touching it, producing a [`WriteBatch`]. [`Mutation::apply`] then commits
//! the batch in memory. Persisting the same batch is the caller's job (see
//! [`crate::DocumentStore`]).
//!
//! ## Mutation Semantics
//!
//! ### Ordering
//! - `order` is unique inside a sibling scope; gaps are allowed
//! - Locked instances never change `order` as a side effect
//!
//! ### Silent outcomes
//! - Unknown ids and locked targets are not errors. They produce
//!   [`MutationOutcome::Unchanged`] with the reason.
//!
//! ### Remove
//! - Removes the instance and all descendants
//! - Refused when the instance or any descendant is locked

use crate::state::DocumentState;
use crate::writes::{Write, WriteBatch};
use pagewright_common::{IssueCollector, ValidationError, ValidationIssue};
use pagewright_model::{CmsBinding, ComponentInstance, Page, SiblingScope, StyleMap};
use pagewright_registry::Registry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Shallow patch for [`Mutation::UpdateInstance`].
///
/// Map fields merge key by key; the rest replace the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstancePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsive_styles: Option<BTreeMap<String, StyleMap>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cms_bindings: Option<Vec<CmsBinding>>,
}

impl InstancePatch {
    pub fn props(props: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            props: Some(props.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn locked(is_locked: bool) -> Self {
        Self {
            is_locked: Some(is_locked),
            ..Default::default()
        }
    }

    pub fn hidden(is_hidden: bool) -> Self {
        Self {
            is_hidden: Some(is_hidden),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Mutation {
    /// Insert at `instance.order`. With `reindex`, a colliding sibling and
    /// the ones after it shift up by one instead of failing.
    AddInstance {
        instance: ComponentInstance,
        reindex: bool,
    },

    UpdateInstance {
        id: String,
        patch: InstancePatch,
    },

    RemoveInstance {
        id: String,
    },

    /// Move within the rendered sequence of one scope
    Reorder {
        scope: SiblingScope,
        from_index: usize,
        to_index: usize,
    },

    /// Move to another parent or page; `index` is the final position
    MoveInstance {
        id: String,
        scope: SiblingScope,
        index: usize,
    },

    /// Deep copy placed right after the source. Descendant copies are named
    /// `<new_id>.<n>`.
    Duplicate {
        id: String,
        new_id: String,
    },

    /// Renumber a scope to `0..n`, locked instances included
    Reindex {
        scope: SiblingScope,
    },

    AddPage {
        page: Page,
    },

    /// Deletes the page and every instance on it, locked or not
    RemovePage {
        page_id: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Index {index} out of range for {len} sibling(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Id already exists: {0}")]
    DuplicateId(String),
}

/// Why a mutation left the document untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unchanged {
    NotFound,
    NotPermitted,
    NoChange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Applied(WriteBatch),
    Unchanged(Unchanged),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied(_))
    }

    pub fn batch(&self) -> Option<&WriteBatch> {
        match self {
            MutationOutcome::Applied(batch) => Some(batch),
            MutationOutcome::Unchanged(_) => None,
        }
    }
}

impl Mutation {
    /// Plan and commit in memory
    pub fn apply(
        &self,
        doc: &mut DocumentState,
        registry: &Registry,
    ) -> Result<MutationOutcome, MutationError> {
        let outcome = self.plan(doc, registry)?;
        if let MutationOutcome::Applied(batch) = &outcome {
            doc.commit(batch);
        }
        Ok(outcome)
    }

    /// Compute the writes this mutation would perform
    pub fn plan(
        &self,
        doc: &DocumentState,
        registry: &Registry,
    ) -> Result<MutationOutcome, MutationError> {
        match self {
            Mutation::AddInstance { instance, reindex } => {
                Self::plan_add(doc, registry, instance, *reindex)
            }
            Mutation::UpdateInstance { id, patch } => Self::plan_update(doc, registry, id, patch),
            Mutation::RemoveInstance { id } => Ok(Self::plan_remove(doc, id)),
            Mutation::Reorder {
                scope,
                from_index,
                to_index,
            } => Self::plan_reorder(doc, scope, *from_index, *to_index),
            Mutation::MoveInstance { id, scope, index } => {
                Self::plan_move(doc, id, scope, *index)
            }
            Mutation::Duplicate { id, new_id } => Self::plan_duplicate(doc, id, new_id),
            Mutation::Reindex { scope } => Ok(Self::plan_reindex(doc, scope)),
            Mutation::AddPage { page } => {
                if doc.page(&page.id).is_some() {
                    return Err(MutationError::DuplicateId(page.id.clone()));
                }
                Ok(applied(vec![Write::PutPage { page: page.clone() }]))
            }
            Mutation::RemovePage { page_id } => Ok(Self::plan_remove_page(doc, page_id)),
        }
    }

    fn plan_add(
        doc: &DocumentState,
        registry: &Registry,
        instance: &ComponentInstance,
        reindex: bool,
    ) -> Result<MutationOutcome, MutationError> {
        let mut issues = IssueCollector::new();
        let mut instance = instance.clone();

        if instance.id.trim().is_empty() {
            issues.push(ValidationIssue::missing("id"));
        } else if doc.contains(&instance.id) {
            issues.push(ValidationIssue::invalid(
                "id",
                format!("instance {} already exists", instance.id),
            ));
        }

        match registry.get_by_id(&instance.registry_id) {
            Some(entry) => {
                instance.source = entry.source.clone();
                instance.props = Registry::classify(entry, instance.props);
                for (name, value) in Registry::default_props(entry).iter() {
                    if !instance.props.contains(name) {
                        instance.props.insert_declared(name.clone(), value.clone());
                    }
                }
                if let Err(err) = Registry::validate_props(entry, &instance.props) {
                    issues.extend(err.issues);
                }
            }
            None => issues.push(ValidationIssue::unknown(
                "registryId",
                format!("no component registered as {}", instance.registry_id),
            )),
        }

        if doc.page(&instance.page_id).is_none() {
            issues.push(ValidationIssue::unknown(
                "pageId",
                format!("page {} does not exist", instance.page_id),
            ));
        }

        if let Some(parent_id) = &instance.parent_id {
            match doc.instance(parent_id) {
                Some(parent) if parent.page_id != instance.page_id => {
                    issues.push(ValidationIssue::invalid(
                        "parentId",
                        format!("parent {} is on page {}", parent_id, parent.page_id),
                    ))
                }
                Some(_) => {}
                None => issues.push(ValidationIssue::unknown(
                    "parentId",
                    format!("instance {} does not exist", parent_id),
                )),
            }
        }

        if instance.order < 0 {
            issues.push(ValidationIssue::invalid("order", "must not be negative"));
        }

        let scope = instance.scope();
        let siblings = doc.siblings(&scope);
        let collision = siblings.iter().find(|s| s.order == instance.order);
        if let (Some(existing), false) = (collision, reindex) {
            issues.push(ValidationIssue::invalid(
                "order",
                format!("{} collides with {}", instance.order, existing.id),
            ));
        }

        let mut instance = issues.finish(instance)?;

        let mut writes = Vec::new();
        if collision.is_some() {
            let position = siblings
                .iter()
                .position(|s| s.order >= instance.order)
                .unwrap_or(siblings.len());
            let placement = doc.place(&scope, position, Some(instance.order));
            instance.order = placement.order;
            writes.extend(set_orders(placement.shifts));
        }

        tracing::debug!(
            "Adding {} ({}) to {} at order {}",
            instance.id,
            instance.registry_id,
            scope,
            instance.order
        );
        writes.push(Write::PutInstance { instance });
        Ok(applied(writes))
    }

    fn plan_update(
        doc: &DocumentState,
        registry: &Registry,
        id: &str,
        patch: &InstancePatch,
    ) -> Result<MutationOutcome, MutationError> {
        let Some(current) = doc.instance(id) else {
            tracing::debug!("Ignoring update of unknown instance {}", id);
            return Ok(MutationOutcome::Unchanged(Unchanged::NotFound));
        };

        let mut updated = current.clone();

        if let Some(props) = &patch.props {
            match registry.get_by_id(&current.registry_id) {
                Some(entry) => {
                    Registry::validate_patch(entry, props)?;
                    for (name, value) in props {
                        if entry.declares(name) {
                            updated.props.insert_declared(name.clone(), value.clone());
                        } else {
                            updated.props.insert_extra(name.clone(), value.clone());
                        }
                    }
                }
                None => {
                    for (name, value) in props {
                        updated.props.insert_extra(name.clone(), value.clone());
                    }
                }
            }
        }

        if let Some(styles) = &patch.styles {
            updated
                .styles
                .get_or_insert_with(StyleMap::new)
                .extend(styles.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        if let Some(responsive) = &patch.responsive_styles {
            let target = updated.responsive_styles.get_or_insert_with(BTreeMap::new);
            for (breakpoint, styles) in responsive {
                target
                    .entry(breakpoint.clone())
                    .or_default()
                    .extend(styles.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        if let Some(is_locked) = patch.is_locked {
            updated.is_locked = is_locked;
        }
        if let Some(is_hidden) = patch.is_hidden {
            updated.is_hidden = is_hidden;
        }
        if let Some(bindings) = &patch.cms_bindings {
            updated.cms_bindings = bindings.clone();
        }

        if &updated == current {
            return Ok(MutationOutcome::Unchanged(Unchanged::NoChange));
        }
        Ok(applied(vec![Write::PutInstance { instance: updated }]))
    }

    fn plan_remove(doc: &DocumentState, id: &str) -> MutationOutcome {
        let Some(instance) = doc.instance(id) else {
            return MutationOutcome::Unchanged(Unchanged::NotFound);
        };

        let descendants = doc.descendants(id);
        let locked = instance.is_locked
            || descendants
                .iter()
                .any(|d| doc.instance(d).map_or(false, |i| i.is_locked));
        if locked {
            tracing::debug!("Refusing to remove {}: locked instance in subtree", id);
            return MutationOutcome::Unchanged(Unchanged::NotPermitted);
        }

        let mut writes: Vec<Write> = descendants
            .into_iter()
            .rev()
            .map(|id| Write::DeleteInstance { id })
            .collect();
        writes.push(Write::DeleteInstance { id: id.to_string() });
        applied(writes)
    }

    fn plan_reorder(
        doc: &DocumentState,
        scope: &SiblingScope,
        from_index: usize,
        to_index: usize,
    ) -> Result<MutationOutcome, MutationError> {
        let siblings = doc.siblings(scope);
        let len = siblings.len();
        for index in [from_index, to_index] {
            if index >= len {
                return Err(MutationError::IndexOutOfRange { index, len });
            }
        }

        if siblings[from_index].is_locked {
            tracing::debug!("Refusing to reorder locked {}", siblings[from_index].id);
            return Ok(MutationOutcome::Unchanged(Unchanged::NotPermitted));
        }
        if from_index == to_index {
            return Ok(MutationOutcome::Unchanged(Unchanged::NoChange));
        }

        let target = unlocked_target(&siblings, from_index, to_index);

        // locked instances keep their slots; unlocked ones rotate through the rest
        let slots: Vec<usize> = (0..len).filter(|i| !siblings[*i].is_locked).collect();
        let mut movable: Vec<&ComponentInstance> = slots.iter().map(|i| siblings[*i]).collect();
        let from_rank = slots.iter().position(|i| *i == from_index).unwrap_or(0);
        let to_rank = slots.iter().position(|i| *i == target).unwrap_or(from_rank);
        let moving = movable.remove(from_rank);
        movable.insert(to_rank, moving);

        let writes: Vec<Write> = slots
            .iter()
            .zip(movable)
            .filter(|(slot, instance)| siblings[**slot].order != instance.order)
            .map(|(slot, instance)| Write::SetOrder {
                id: instance.id.clone(),
                order: siblings[*slot].order,
            })
            .collect();

        if writes.is_empty() {
            return Ok(MutationOutcome::Unchanged(Unchanged::NoChange));
        }
        tracing::debug!("Reordered {} in {}: {} -> {}", siblings[from_index].id, scope, from_index, target);
        Ok(applied(writes))
    }

    fn plan_move(
        doc: &DocumentState,
        id: &str,
        scope: &SiblingScope,
        index: usize,
    ) -> Result<MutationOutcome, MutationError> {
        let Some(instance) = doc.instance(id) else {
            return Ok(MutationOutcome::Unchanged(Unchanged::NotFound));
        };
        if instance.is_locked {
            return Ok(MutationOutcome::Unchanged(Unchanged::NotPermitted));
        }
        if doc.page(&scope.page_id).is_none() {
            return Err(MutationError::PageNotFound(scope.page_id.clone()));
        }
        if let Some(parent_id) = &scope.parent_id {
            match doc.instance(parent_id) {
                Some(parent) if parent.page_id == scope.page_id => {}
                _ => return Err(MutationError::ParentNotFound(parent_id.clone())),
            }
            if doc.is_self_or_descendant(parent_id, id) {
                return Err(MutationError::CycleDetected);
            }
        }

        if instance.scope() == *scope {
            let len = doc.siblings(scope).len();
            let from_index = doc.index_in_scope(id).unwrap_or(0);
            let to_index = index.min(len.saturating_sub(1));
            return Self::plan_reorder(doc, scope, from_index, to_index);
        }

        let placement = doc.place(scope, index, None);
        let mut writes = set_orders(placement.shifts);

        let mut moved = instance.clone();
        moved.page_id = scope.page_id.clone();
        moved.parent_id = scope.parent_id.clone();
        moved.order = placement.order;
        writes.push(Write::PutInstance { instance: moved });

        if instance.page_id != scope.page_id {
            for descendant in doc.descendants(id) {
                if let Some(child) = doc.instance(&descendant) {
                    let mut child = child.clone();
                    child.page_id = scope.page_id.clone();
                    writes.push(Write::PutInstance { instance: child });
                }
            }
        }

        tracing::debug!("Moved {} from {} to {}", id, instance.scope(), scope);
        Ok(applied(writes))
    }

    fn plan_duplicate(
        doc: &DocumentState,
        id: &str,
        new_id: &str,
    ) -> Result<MutationOutcome, MutationError> {
        let Some(source) = doc.instance(id) else {
            return Ok(MutationOutcome::Unchanged(Unchanged::NotFound));
        };

        let descendants = doc.descendants(id);
        let mut ids: HashMap<&str, String> = HashMap::new();
        ids.insert(id, new_id.to_string());
        for (n, descendant) in descendants.iter().enumerate() {
            ids.insert(descendant.as_str(), format!("{}.{}", new_id, n + 1));
        }
        for copy_id in ids.values() {
            if doc.contains(copy_id) {
                return Err(MutationError::DuplicateId(copy_id.clone()));
            }
        }

        let scope = source.scope();
        let position = doc.index_in_scope(id).map_or(0, |i| i + 1);
        let placement = doc.place(&scope, position, Some(source.order + 1));
        let mut writes = set_orders(placement.shifts);

        let mut copy = source.clone();
        copy.id = new_id.to_string();
        copy.order = placement.order;
        writes.push(Write::PutInstance { instance: copy });

        for descendant in &descendants {
            let Some(original) = doc.instance(descendant) else {
                continue;
            };
            let mut copy = original.clone();
            copy.id = ids[descendant.as_str()].clone();
            copy.parent_id = original
                .parent_id
                .as_deref()
                .and_then(|p| ids.get(p).cloned());
            writes.push(Write::PutInstance { instance: copy });
        }

        tracing::debug!("Duplicated {} as {} ({} descendant(s))", id, new_id, descendants.len());
        Ok(applied(writes))
    }

    fn plan_reindex(doc: &DocumentState, scope: &SiblingScope) -> MutationOutcome {
        let writes: Vec<Write> = doc
            .siblings(scope)
            .iter()
            .enumerate()
            .filter(|(n, instance)| instance.order != *n as i64)
            .map(|(n, instance)| Write::SetOrder {
                id: instance.id.clone(),
                order: n as i64,
            })
            .collect();

        if writes.is_empty() {
            MutationOutcome::Unchanged(Unchanged::NoChange)
        } else {
            applied(writes)
        }
    }

    fn plan_remove_page(doc: &DocumentState, page_id: &str) -> MutationOutcome {
        if doc.page(page_id).is_none() {
            return MutationOutcome::Unchanged(Unchanged::NotFound);
        }

        let mut writes: Vec<Write> = doc
            .page_instances(page_id)
            .into_iter()
            .map(|i| Write::DeleteInstance { id: i.id.clone() })
            .collect();
        tracing::debug!("Removing page {} with {} instance(s)", page_id, writes.len());
        writes.push(Write::DeletePage {
            id: page_id.to_string(),
        });
        applied(writes)
    }
}

fn applied(writes: Vec<Write>) -> MutationOutcome {
    MutationOutcome::Applied(WriteBatch { writes })
}

fn set_orders(shifts: Vec<(String, i64)>) -> Vec<Write> {
    shifts
        .into_iter()
        .map(|(id, order)| Write::SetOrder { id, order })
        .collect()
}

/// Resolve a drop index onto an unlocked slot: skip locked siblings in the
/// direction of travel, falling back to the other direction at the edge
fn unlocked_target(siblings: &[&ComponentInstance], from: usize, to: usize) -> usize {
    if !siblings[to].is_locked {
        return to;
    }
    let forward = to > from;
    let ahead = if forward {
        (to + 1..siblings.len()).find(|i| !siblings[*i].is_locked)
    } else {
        (0..to).rev().find(|i| !siblings[*i].is_locked)
    };
    ahead.unwrap_or_else(|| {
        let behind = if forward {
            (from..to).rev().find(|i| !siblings[*i].is_locked)
        } else {
            (to + 1..=from).find(|i| !siblings[*i].is_locked)
        };
        behind.unwrap_or(from)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_model::{PropMap, SourceFamily};
    use pagewright_registry::{PropField, PropType, RegistryEntry};
    use serde_json::json;

    fn registry() -> Registry {
        Registry::new(vec![
            RegistryEntry::new("shadcn-hero", "Hero", "shadcn")
                .with_prop(PropField::new("headline", PropType::String).with_default(json!("Hello")))
                .with_prop(PropField::new("accent", PropType::Color)),
            RegistryEntry::new("shadcn-card", "Card", "shadcn"),
        ])
        .unwrap()
    }

    fn inst(id: &str, order: i64) -> ComponentInstance {
        ComponentInstance::new(id, "home", "shadcn-card", SourceFamily::from("shadcn"), order)
    }

    fn doc(instances: Vec<ComponentInstance>) -> DocumentState {
        DocumentState::from_parts(vec![Page::new("home", "proj", "Home", "home", 0)], instances)
    }

    fn order_of(doc: &DocumentState) -> Vec<(String, i64)> {
        doc.siblings(&SiblingScope::page("home"))
            .iter()
            .map(|i| (i.id.clone(), i.order))
            .collect()
    }

    #[test]
    fn test_add_reports_every_problem() {
        let mut doc = doc(vec![inst("a", 0)]);
        let mut instance =
            ComponentInstance::new("a", "missing-page", "nope", SourceFamily::from("x"), 0);
        instance.parent_id = Some("ghost".to_string());

        let err = Mutation::AddInstance {
            instance,
            reindex: false,
        }
        .apply(&mut doc, &registry())
        .unwrap_err();

        let MutationError::Validation(err) = err else {
            panic!("expected validation error");
        };
        assert!(err.mentions("id"));
        assert!(err.mentions("registryId"));
        assert!(err.mentions("pageId"));
        assert!(err.mentions("parentId"));
    }

    #[test]
    fn test_add_rejects_collision_without_reindex() {
        let mut doc = doc(vec![inst("a", 0)]);
        let result = Mutation::AddInstance {
            instance: inst("b", 0),
            reindex: false,
        }
        .apply(&mut doc, &registry());
        assert!(matches!(result, Err(MutationError::Validation(e)) if e.mentions("order")));
    }

    #[test]
    fn test_add_with_reindex_shifts_followers() {
        let mut doc = doc(vec![inst("a", 0), inst("b", 1)]);
        Mutation::AddInstance {
            instance: inst("new", 0),
            reindex: true,
        }
        .apply(&mut doc, &registry())
        .unwrap();

        assert_eq!(
            order_of(&doc),
            vec![("new".into(), 0), ("a".into(), 1), ("b".into(), 2)]
        );
    }

    #[test]
    fn test_add_validates_prop_types() {
        let mut doc = doc(vec![]);
        let mut props = PropMap::new();
        props.insert_declared("accent", json!(42));
        let instance = ComponentInstance::new("h", "home", "shadcn-hero", SourceFamily::from("?"), 0)
            .with_props(props);

        let result = Mutation::AddInstance {
            instance,
            reindex: false,
        }
        .apply(&mut doc, &registry());
        assert!(matches!(result, Err(MutationError::Validation(e)) if e.mentions("props.accent")));
    }

    #[test]
    fn test_update_merges_and_is_idempotent() {
        let mut doc = doc(vec![inst("a", 0)]);
        let registry = registry();
        let patch = InstancePatch {
            props: Some(BTreeMap::from([("title".to_string(), json!("Hi"))])),
            styles: Some(StyleMap::from([("color".to_string(), "red".to_string())])),
            ..Default::default()
        };

        let first = Mutation::UpdateInstance {
            id: "a".into(),
            patch: patch.clone(),
        }
        .apply(&mut doc, &registry)
        .unwrap();
        let after_first = doc.clone();
        let second = Mutation::UpdateInstance {
            id: "a".into(),
            patch,
        }
        .apply(&mut doc, &registry)
        .unwrap();

        assert!(first.is_applied());
        assert_eq!(second, MutationOutcome::Unchanged(Unchanged::NoChange));
        assert_eq!(doc, after_first);
        assert_eq!(doc.instance("a").unwrap().props.get_str("title"), Some("Hi"));
    }

    #[test]
    fn test_update_unknown_is_silent() {
        let mut doc = doc(vec![]);
        let outcome = Mutation::UpdateInstance {
            id: "ghost".into(),
            patch: InstancePatch::hidden(true),
        }
        .apply(&mut doc, &registry())
        .unwrap();
        assert_eq!(outcome, MutationOutcome::Unchanged(Unchanged::NotFound));
    }

    #[test]
    fn test_remove_refuses_locked_descendant() {
        let mut doc = doc(vec![inst("a", 0), inst("child", 0).with_parent("a").locked()]);
        let outcome = Mutation::RemoveInstance { id: "a".into() }
            .apply(&mut doc, &registry())
            .unwrap();
        assert_eq!(outcome, MutationOutcome::Unchanged(Unchanged::NotPermitted));
        assert_eq!(doc.instance_count(), 2);
    }

    #[test]
    fn test_remove_leaves_gap() {
        let mut doc = doc(vec![inst("a", 0), inst("b", 1), inst("c", 2)]);
        Mutation::RemoveInstance { id: "b".into() }
            .apply(&mut doc, &registry())
            .unwrap();
        assert_eq!(order_of(&doc), vec![("a".into(), 0), ("c".into(), 2)]);
    }

    #[test]
    fn test_reorder_keeps_locked_slot() {
        let mut doc = doc(vec![inst("a", 0), inst("b", 1).locked(), inst("c", 2), inst("d", 3)]);
        Mutation::Reorder {
            scope: SiblingScope::page("home"),
            from_index: 0,
            to_index: 3,
        }
        .apply(&mut doc, &registry())
        .unwrap();

        assert_eq!(
            order_of(&doc),
            vec![("c".into(), 0), ("b".into(), 1), ("d".into(), 2), ("a".into(), 3)]
        );
    }

    #[test]
    fn test_reorder_skips_locked_drop_target() {
        let mut doc = doc(vec![inst("a", 0), inst("b", 1).locked(), inst("c", 2)]);
        // dropping onto b's slot lands past it
        Mutation::Reorder {
            scope: SiblingScope::page("home"),
            from_index: 0,
            to_index: 1,
        }
        .apply(&mut doc, &registry())
        .unwrap();

        assert_eq!(
            order_of(&doc),
            vec![("c".into(), 0), ("b".into(), 1), ("a".into(), 2)]
        );
    }

    #[test]
    fn test_reorder_locked_source_is_not_permitted() {
        let mut doc = doc(vec![inst("a", 0).locked(), inst("b", 1)]);
        let outcome = Mutation::Reorder {
            scope: SiblingScope::page("home"),
            from_index: 0,
            to_index: 1,
        }
        .apply(&mut doc, &registry())
        .unwrap();
        assert_eq!(outcome, MutationOutcome::Unchanged(Unchanged::NotPermitted));
    }

    #[test]
    fn test_duplicate_copies_subtree() {
        let mut doc = doc(vec![
            inst("a", 0),
            inst("b", 1),
            inst("a-child", 0).with_parent("a"),
        ]);
        Mutation::Duplicate {
            id: "a".into(),
            new_id: "copy".into(),
        }
        .apply(&mut doc, &registry())
        .unwrap();

        assert_eq!(
            order_of(&doc),
            vec![("a".into(), 0), ("copy".into(), 1), ("b".into(), 2)]
        );
        let child = doc.instance("copy.1").unwrap();
        assert_eq!(child.parent_id.as_deref(), Some("copy"));
        assert_eq!(child.order, 0);
    }

    #[test]
    fn test_move_into_own_subtree_is_a_cycle() {
        let mut doc = doc(vec![inst("a", 0), inst("a-child", 0).with_parent("a")]);
        let result = Mutation::MoveInstance {
            id: "a".into(),
            scope: SiblingScope::child_of("home", "a-child"),
            index: 0,
        }
        .apply(&mut doc, &registry());
        assert_eq!(result, Err(MutationError::CycleDetected));
    }

    #[test]
    fn test_move_to_new_parent() {
        let mut doc = doc(vec![inst("a", 0), inst("b", 1), inst("c", 0).with_parent("a")]);
        Mutation::MoveInstance {
            id: "b".into(),
            scope: SiblingScope::child_of("home", "a"),
            index: 0,
        }
        .apply(&mut doc, &registry())
        .unwrap();

        let children: Vec<(String, i64)> = doc
            .children("home", "a")
            .iter()
            .map(|i| (i.id.clone(), i.order))
            .collect();
        assert_eq!(children, vec![("b".into(), 0), ("c".into(), 1)]);
    }

    #[test]
    fn test_remove_page_cascades() {
        let mut doc = doc(vec![inst("a", 0).locked(), inst("b", 1)]);
        Mutation::RemovePage {
            page_id: "home".into(),
        }
        .apply(&mut doc, &registry())
        .unwrap();
        assert_eq!(doc.instance_count(), 0);
        assert!(doc.page("home").is_none());
    }
}
