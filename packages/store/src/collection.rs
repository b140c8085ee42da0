use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A stored document: JSON object with a string `id`
pub type Record = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Projects,
    Pages,
    DesignSystems,
    ComponentInstances,
    CmsCollections,
    CmsItems,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Projects,
        Collection::Pages,
        Collection::DesignSystems,
        Collection::ComponentInstances,
        Collection::CmsCollections,
        Collection::CmsItems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::Pages => "pages",
            Collection::DesignSystems => "designSystems",
            Collection::ComponentInstances => "componentInstances",
            Collection::CmsCollections => "cmsCollections",
            Collection::CmsItems => "cmsItems",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown collection `{}`", s))
    }
}
