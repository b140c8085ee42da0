use crate::props::PropMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// CSS-like property → value overrides
pub type StyleMap = BTreeMap<String, String>;

/// Component family tag ("shadcn", "magicui", ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceFamily(pub String);

impl SourceFamily {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceFamily {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Where a bound CMS value is injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingTarget {
    Prop,
    Style,
}

/// Live link from an instance slot to an external content field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsBinding {
    pub field_slug: String,
    pub collection_id: String,
    /// Specific item; the collection's first item when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub target_type: BindingTarget,
    pub target_key: String,
}

/// Sibling group: instances sharing a page and a parent
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiblingScope {
    pub page_id: String,
    pub parent_id: Option<String>,
}

impl SiblingScope {
    pub fn page(page_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            parent_id: None,
        }
    }

    pub fn child_of(page_id: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            parent_id: Some(parent_id.into()),
        }
    }
}

impl fmt::Display for SiblingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent_id {
            Some(parent) => write!(f, "{}/{}", self.page_id, parent),
            None => write!(f, "{}/<root>", self.page_id),
        }
    }
}

/// One placed, configured occurrence of a registry component on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    pub id: String,
    pub page_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub registry_id: String,
    pub source: SourceFamily,
    /// Sort key among siblings; unique within the scope, gaps allowed
    pub order: i64,
    #[serde(default)]
    pub props: PropMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive_styles: Option<BTreeMap<String, StyleMap>>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cms_bindings: Vec<CmsBinding>,
}

impl ComponentInstance {
    pub fn new(
        id: impl Into<String>,
        page_id: impl Into<String>,
        registry_id: impl Into<String>,
        source: SourceFamily,
        order: i64,
    ) -> Self {
        Self {
            id: id.into(),
            page_id: page_id.into(),
            parent_id: None,
            registry_id: registry_id.into(),
            source,
            order,
            props: PropMap::new(),
            styles: None,
            responsive_styles: None,
            is_locked: false,
            is_hidden: false,
            cms_bindings: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_props(mut self, props: PropMap) -> Self {
        self.props = props;
        self
    }

    pub fn locked(mut self) -> Self {
        self.is_locked = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_hidden = true;
        self
    }

    pub fn scope(&self) -> SiblingScope {
        SiblingScope {
            page_id: self.page_id.clone(),
            parent_id: self.parent_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_instance_uses_store_field_names() {
        let mut instance =
            ComponentInstance::new("i-1", "p-1", "shadcn-hero", SourceFamily::from("shadcn"), 3);
        instance.cms_bindings.push(CmsBinding {
            field_slug: "title".to_string(),
            collection_id: "posts".to_string(),
            item_id: None,
            target_type: BindingTarget::Prop,
            target_key: "headline".to_string(),
        });

        let json = serde_json::to_value(&instance).unwrap();
        assert_eq!(json["pageId"], json!("p-1"));
        assert_eq!(json["registryId"], json!("shadcn-hero"));
        assert_eq!(json["isLocked"], json!(false));
        assert_eq!(json["cmsBindings"][0]["targetType"], json!("prop"));
        assert!(json.get("parentId").is_none());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let instance: ComponentInstance = serde_json::from_value(json!({
            "id": "i-1",
            "pageId": "p-1",
            "registryId": "x",
            "source": "magicui",
            "order": 0
        }))
        .unwrap();

        assert!(!instance.is_hidden);
        assert!(instance.props.is_empty());
        assert_eq!(instance.scope(), SiblingScope::page("p-1"));
    }
}
