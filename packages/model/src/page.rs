use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_system_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            design_system_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One routable document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub slug: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        name: impl Into<String>,
        slug: impl Into<String>,
        order: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            project_id: project_id.into(),
            name: name.into(),
            slug: slug.into(),
            order,
            created_at: now,
            updated_at: now,
        }
    }

    /// Route path for the page; the `index`/empty slug maps to `/`
    pub fn route(&self) -> String {
        let slug = self.slug.trim_matches('/');
        if slug.is_empty() || slug == "index" || slug == "home" {
            "/".to_string()
        } else {
            format!("/{}", slug)
        }
    }
}
