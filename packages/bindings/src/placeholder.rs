//! `"{name}"` placeholder protocol shared by both bridges.
//!
//! A prop is a placeholder only when its whole string value is one name in
//! single braces. `{{token.colors.primary}}` is the export engine's syntax
//! and is left alone here.

use pagewright_model::ComponentInstance;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Props to merge into one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropPatch {
    pub instance_id: String,
    pub props: BTreeMap<String, Value>,
}

impl PropPatch {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            props: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}$").expect("placeholder pattern is valid")
    })
}

/// Name inside a `"{name}"` value
pub fn placeholder_name(value: &str) -> Option<&str> {
    placeholder_regex()
        .captures(value)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Replace every placeholder prop whose name `lookup` knows.
///
/// Instances with nothing to change produce no patch. Values that already
/// equal the resolved value are skipped.
pub fn resolve_placeholders<'a>(
    instances: impl IntoIterator<Item = &'a ComponentInstance>,
    mut lookup: impl FnMut(&ComponentInstance, &str) -> Option<Value>,
) -> Vec<PropPatch> {
    let mut patches = Vec::new();
    for instance in instances {
        let mut patch = PropPatch::new(instance.id.clone());
        for (prop, value) in instance.props.iter() {
            let Some(name) = value.as_str().and_then(placeholder_name) else {
                continue;
            };
            match lookup(instance, name) {
                Some(resolved) if &resolved != value => {
                    patch.props.insert(prop.clone(), resolved);
                }
                Some(_) => {}
                None => tracing::debug!("Leaving unresolved {{{}}} on {}", name, instance.id),
            }
        }
        if !patch.is_empty() {
            patches.push(patch);
        }
    }
    patches
}

/// Fold patches for the same instance together, keeping first-seen order
pub fn merge_patches(patches: impl IntoIterator<Item = PropPatch>) -> Vec<PropPatch> {
    let mut merged: Vec<PropPatch> = Vec::new();
    for patch in patches {
        match merged.iter_mut().find(|p| p.instance_id == patch.instance_id) {
            Some(existing) => existing.props.extend(patch.props),
            None => merged.push(patch),
        }
    }
    merged.retain(|p| !p.is_empty());
    merged
}
