use crate::instance::ComponentInstance;
use crate::page::Page;
use serde::{Deserialize, Serialize};

/// Point-in-time copy of one page and its instances in rendered order.
///
/// Hidden instances are included; consumers decide whether to skip them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub page: Page,
    pub instances: Vec<ComponentInstance>,
}

impl PageSnapshot {
    pub fn new(page: Page, instances: Vec<ComponentInstance>) -> Self {
        Self { page, instances }
    }

    /// Instances that render, in order. Children of hidden instances are
    /// skipped along with them.
    pub fn visible(&self) -> Vec<&ComponentInstance> {
        let mut hidden: Vec<&str> = Vec::new();
        let mut out = Vec::new();
        for instance in &self.instances {
            let under_hidden = instance
                .parent_id
                .as_deref()
                .map_or(false, |p| hidden.contains(&p));
            if instance.is_hidden || under_hidden {
                hidden.push(&instance.id);
            } else {
                out.push(instance);
            }
        }
        out
    }

    /// Direct children of `parent` (or the page root) among visible instances
    pub fn visible_children<'a>(
        visible: &[&'a ComponentInstance],
        parent: Option<&str>,
    ) -> Vec<&'a ComponentInstance> {
        visible
            .iter()
            .filter(|i| i.parent_id.as_deref() == parent)
            .copied()
            .collect()
    }
}
