//! # Document State
//!
//! Arena of pages and component instances for one project.
//!
//! Every instance lives in one flat map keyed by id. Parent/child structure
//! and sibling order are relational (`parent_id`, `order`), so moving an
//! instance touches only its old and new sibling groups.

use pagewright_model::{ComponentInstance, Page, SiblingScope};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentState {
    pub(crate) pages: BTreeMap<String, Page>,
    pub(crate) instances: BTreeMap<String, ComponentInstance>,
}

/// Where a new sibling lands and which unlocked siblings must shift
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub order: i64,
    pub shifts: Vec<(String, i64)>,
}

impl DocumentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        pages: impl IntoIterator<Item = Page>,
        instances: impl IntoIterator<Item = ComponentInstance>,
    ) -> Self {
        Self {
            pages: pages.into_iter().map(|p| (p.id.clone(), p)).collect(),
            instances: instances.into_iter().map(|i| (i.id.clone(), i)).collect(),
        }
    }

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.get(id)
    }

    /// Pages sorted by `order`
    pub fn pages(&self) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self.pages.values().collect();
        pages.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        pages
    }

    pub fn instance(&self, id: &str) -> Option<&ComponentInstance> {
        self.instances.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.instances.contains_key(id)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Siblings of a scope in rendered order.
    ///
    /// `order` is a sort key, not a dense index: gaps left by deletes are
    /// tolerated here.
    pub fn siblings(&self, scope: &SiblingScope) -> Vec<&ComponentInstance> {
        let mut siblings: Vec<&ComponentInstance> = self
            .instances
            .values()
            .filter(|i| i.page_id == scope.page_id && i.parent_id == scope.parent_id)
            .collect();
        siblings.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        siblings
    }

    pub fn children(&self, page_id: &str, parent_id: &str) -> Vec<&ComponentInstance> {
        self.siblings(&SiblingScope::child_of(page_id, parent_id))
    }

    /// Position of an instance inside its own sibling group
    pub fn index_in_scope(&self, id: &str) -> Option<usize> {
        let instance = self.instances.get(id)?;
        self.siblings(&instance.scope())
            .iter()
            .position(|s| s.id == id)
    }

    /// Ids of every descendant, depth-first in rendered order
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(instance) = self.instances.get(id) {
            self.collect_descendants(&instance.page_id, id, &mut out);
        }
        out
    }

    fn collect_descendants(&self, page_id: &str, id: &str, out: &mut Vec<String>) {
        for child in self.children(page_id, id) {
            out.push(child.id.clone());
            self.collect_descendants(page_id, &child.id, out);
        }
    }

    /// True if `candidate` is `ancestor` or sits somewhere below it
    pub fn is_self_or_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        let mut current = Some(candidate.to_string());
        let mut hops = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.instances.len() {
                // corrupt parent chain
                return false;
            }
            current = self.instances.get(&id).and_then(|i| i.parent_id.clone());
        }
        false
    }

    /// Whole page tree flattened depth-first in rendered order
    pub fn render_order(&self, page_id: &str) -> Vec<&ComponentInstance> {
        let mut out = Vec::new();
        self.collect_render_order(&SiblingScope::page(page_id), &mut out);
        out
    }

    fn collect_render_order<'a>(&'a self, scope: &SiblingScope, out: &mut Vec<&'a ComponentInstance>) {
        for instance in self.siblings(scope) {
            out.push(instance);
            self.collect_render_order(
                &SiblingScope::child_of(scope.page_id.clone(), instance.id.clone()),
                out,
            );
        }
    }

    /// Every instance on a page, including ones whose parent chain is broken
    pub fn page_instances(&self, page_id: &str) -> Vec<&ComponentInstance> {
        self.instances
            .values()
            .filter(|i| i.page_id == page_id)
            .collect()
    }

    /// Find an order for a new sibling inserted at `position`.
    ///
    /// Unlocked siblings at or after the insertion point are pushed up by one
    /// as needed. Locked siblings never move: when one blocks the cascade the
    /// insertion point slides past it.
    pub fn place(&self, scope: &SiblingScope, position: usize, preferred: Option<i64>) -> Placement {
        let siblings = self.siblings(scope);
        let mut position = position.min(siblings.len());
        let mut preferred = preferred;

        loop {
            let lower = position.checked_sub(1).map(|p| siblings[p].order);
            let order = match preferred {
                Some(o) if lower.map_or(o >= 0, |l| o > l) => o,
                _ => lower.map_or(0, |l| l + 1),
            };

            let mut shifts = Vec::new();
            let mut current = order;
            let mut blocked_at = None;
            for (offset, sibling) in siblings[position..].iter().enumerate() {
                if sibling.order > current {
                    break;
                }
                if sibling.is_locked {
                    blocked_at = Some(position + offset);
                    break;
                }
                current += 1;
                shifts.push((sibling.id.clone(), current));
            }

            match blocked_at {
                None => return Placement { order, shifts },
                Some(index) => {
                    position = index + 1;
                    preferred = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_model::SourceFamily;

    fn inst(id: &str, order: i64) -> ComponentInstance {
        ComponentInstance::new(id, "home", "hero", SourceFamily::from("shadcn"), order)
    }

    fn state(instances: Vec<ComponentInstance>) -> DocumentState {
        DocumentState::from_parts(vec![Page::new("home", "proj", "Home", "home", 0)], instances)
    }

    #[test]
    fn test_siblings_tolerate_gaps() {
        let doc = state(vec![inst("c", 10), inst("a", 0), inst("b", 4)]);
        let ids: Vec<&str> = doc
            .siblings(&SiblingScope::page("home"))
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(doc.index_in_scope("c"), Some(2));
    }

    #[test]
    fn test_render_order_is_depth_first() {
        let doc = state(vec![
            inst("section", 0),
            inst("footer", 1),
            inst("card-2", 1).with_parent("section"),
            inst("card-1", 0).with_parent("section"),
        ]);
        let ids: Vec<&str> = doc.render_order("home").iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["section", "card-1", "card-2", "footer"]);
        assert_eq!(doc.descendants("section"), vec!["card-1", "card-2"]);
        assert!(doc.is_self_or_descendant("card-1", "section"));
        assert!(!doc.is_self_or_descendant("section", "card-1"));
    }

    #[test]
    fn test_place_uses_gap_without_shifting() {
        let doc = state(vec![inst("a", 0), inst("b", 5)]);
        let placement = doc.place(&SiblingScope::page("home"), 1, None);
        assert_eq!(placement, Placement { order: 1, shifts: vec![] });
    }

    #[test]
    fn test_place_cascades_over_unlocked() {
        let doc = state(vec![inst("a", 0), inst("b", 1), inst("c", 2)]);
        let placement = doc.place(&SiblingScope::page("home"), 1, None);
        assert_eq!(placement.order, 1);
        assert_eq!(
            placement.shifts,
            vec![("b".to_string(), 2), ("c".to_string(), 3)]
        );
    }

    #[test]
    fn test_place_slides_past_locked() {
        let doc = state(vec![inst("a", 0), inst("b", 1).locked(), inst("c", 2)]);
        let placement = doc.place(&SiblingScope::page("home"), 1, None);
        // b cannot move, so the new sibling lands after it and pushes c
        assert_eq!(placement.order, 2);
        assert_eq!(placement.shifts, vec![("c".to_string(), 3)]);
    }
}
