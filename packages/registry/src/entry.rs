use crate::dependency::PackageSpec;
use crate::schema::PropField;
use pagewright_model::SourceFamily;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque reference to a component's source, resolved at build time.
///
/// `file:<path>` pins an exact file relative to the components root; any
/// other value leaves resolution to filename matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLocator(pub String);

impl SourceLocator {
    pub fn explicit_path(&self) -> Option<&str> {
        self.0.strip_prefix("file:").map(str::trim).filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub id: String,
    pub display_name: String,
    pub source: SourceFamily,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub prop_schema: Vec<PropField>,
    #[serde(default)]
    pub dependencies: BTreeSet<String>,
    #[serde(default)]
    pub source_locator: SourceLocator,
    /// Symbol exported by the source module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_name: Option<String>,
}

impl RegistryEntry {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, source: &str) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            source: SourceFamily::from(source),
            category: None,
            prop_schema: Vec::new(),
            dependencies: BTreeSet::new(),
            source_locator: SourceLocator::default(),
            export_name: None,
        }
    }

    pub fn with_prop(mut self, field: PropField) -> Self {
        self.prop_schema.push(field);
        self
    }

    pub fn with_dependency(mut self, spec: impl Into<String>) -> Self {
        self.dependencies.insert(spec.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&PropField> {
        self.prop_schema.iter().find(|f| f.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Id with the `<family>-` prefix removed
    pub fn module_slug(&self) -> &str {
        let prefix = format!("{}-", self.source.as_str());
        self.id.strip_prefix(prefix.as_str()).unwrap_or(&self.id)
    }

    pub fn export_name(&self) -> String {
        self.export_name
            .clone()
            .unwrap_or_else(|| to_pascal_case(self.module_slug()))
    }

    pub fn packages(&self) -> Vec<PackageSpec> {
        self.dependencies.iter().map(|d| PackageSpec::parse(d)).collect()
    }

    /// Text the content bridge matches section keys against
    pub fn family_name(&self) -> String {
        let mut name = format!("{} {}", self.id, self.display_name);
        if let Some(category) = &self.category {
            name.push(' ');
            name.push_str(category);
        }
        name.to_lowercase()
    }
}

pub fn to_pascal_case(slug: &str) -> String {
    slug.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
