use crate::instance::CmsBinding;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsField {
    pub slug: String,
    pub name: String,
    #[serde(default = "default_field_type")]
    pub field_type: String,
}

fn default_field_type() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsCollection {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub fields: Vec<CmsField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsItem {
    pub id: String,
    pub collection_id: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CmsLookupError {
    #[error("CMS collection not found: {0}")]
    CollectionNotFound(String),

    #[error("CMS item not found: {0}")]
    ItemNotFound(String),

    #[error("CMS collection {0} has no items")]
    EmptyCollection(String),

    #[error("CMS field `{field}` missing on item {item_id}")]
    FieldNotFound { field: String, item_id: String },
}

/// Point-in-time copy of a project's CMS content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsSnapshot {
    pub collections: Vec<CmsCollection>,
    pub items: Vec<CmsItem>,
}

impl CmsSnapshot {
    pub fn collection(&self, id: &str) -> Option<&CmsCollection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Items of a collection sorted by `order`
    pub fn items_of(&self, collection_id: &str) -> Vec<&CmsItem> {
        let mut items: Vec<&CmsItem> = self
            .items
            .iter()
            .filter(|i| i.collection_id == collection_id)
            .collect();
        items.sort_by_key(|i| i.order);
        items
    }

    /// Current value of the field a binding points at
    pub fn resolve(&self, binding: &CmsBinding) -> Result<&Value, CmsLookupError> {
        if self.collection(&binding.collection_id).is_none() {
            return Err(CmsLookupError::CollectionNotFound(
                binding.collection_id.clone(),
            ));
        }

        let item = match &binding.item_id {
            Some(item_id) => self
                .items
                .iter()
                .find(|i| &i.id == item_id && i.collection_id == binding.collection_id)
                .ok_or_else(|| CmsLookupError::ItemNotFound(item_id.clone()))?,
            None => *self
                .items_of(&binding.collection_id)
                .first()
                .ok_or_else(|| CmsLookupError::EmptyCollection(binding.collection_id.clone()))?,
        };

        item.data
            .get(&binding.field_slug)
            .ok_or_else(|| CmsLookupError::FieldNotFound {
                field: binding.field_slug.clone(),
                item_id: item.id.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::BindingTarget;
    use serde_json::json;

    fn snapshot() -> CmsSnapshot {
        CmsSnapshot {
            collections: vec![CmsCollection {
                id: "posts".to_string(),
                project_id: "proj".to_string(),
                name: "Posts".to_string(),
                slug: "posts".to_string(),
                fields: vec![],
            }],
            items: vec![
                CmsItem {
                    id: "second".to_string(),
                    collection_id: "posts".to_string(),
                    order: 2,
                    data: [("title".to_string(), json!("Second"))].into_iter().collect(),
                },
                CmsItem {
                    id: "first".to_string(),
                    collection_id: "posts".to_string(),
                    order: 1,
                    data: [("title".to_string(), json!("First"))].into_iter().collect(),
                },
            ],
        }
    }

    fn binding(item_id: Option<&str>, field: &str) -> CmsBinding {
        CmsBinding {
            field_slug: field.to_string(),
            collection_id: "posts".to_string(),
            item_id: item_id.map(str::to_string),
            target_type: BindingTarget::Prop,
            target_key: "headline".to_string(),
        }
    }

    #[test]
    fn test_resolves_first_item_by_order() {
        let cms = snapshot();
        assert_eq!(cms.resolve(&binding(None, "title")), Ok(&json!("First")));
        assert_eq!(
            cms.resolve(&binding(Some("second"), "title")),
            Ok(&json!("Second"))
        );
    }

    #[test]
    fn test_missing_field_is_reported() {
        let cms = snapshot();
        assert!(matches!(
            cms.resolve(&binding(None, "body")),
            Err(CmsLookupError::FieldNotFound { .. })
        ));
    }
}
