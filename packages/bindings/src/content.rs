//! # Content Bridge
//!
//! Maps a marketing-copy document onto instance props.
//!
//! Each section (`hero`, `features`, ...) targets instances whose registry
//! family name contains one of the section's match terms, case-insensitive.
//! Section fields are written under a fixed list of prop aliases so older
//! components keep working (hero `headline` also sets `title`).
//!
//! Field names are read as written or in snake_case (`ctaPrimary` or
//! `cta_primary`).
//!
//! Independently, any prop whose value is `"{field}"` is filled from the
//! first section, in document order, that has a field of that name. Known
//! sections come first in their fixed order, then any other object-valued
//! top-level keys sorted by name. When several sections define the same
//! field only the first is used; the collision is reported rather than
//! resolved.

use crate::error::BindingResult;
use crate::placeholder::{merge_patches, resolve_placeholders, PropPatch};
use pagewright_common::{IssueCollector, ValidationError, ValidationIssue};
use pagewright_model::ComponentInstance;
use pagewright_registry::Registry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentSection {
    Hero,
    Features,
    Testimonials,
    Pricing,
    Faq,
    Cta,
    Footer,
}

impl ContentSection {
    /// Document order
    pub const ALL: [ContentSection; 7] = [
        ContentSection::Hero,
        ContentSection::Features,
        ContentSection::Testimonials,
        ContentSection::Pricing,
        ContentSection::Faq,
        ContentSection::Cta,
        ContentSection::Footer,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ContentSection::Hero => "hero",
            ContentSection::Features => "features",
            ContentSection::Testimonials => "testimonials",
            ContentSection::Pricing => "pricing",
            ContentSection::Faq => "faq",
            ContentSection::Cta => "cta",
            ContentSection::Footer => "footer",
        }
    }

    fn match_terms(&self) -> &'static [&'static str] {
        match self {
            ContentSection::Hero => &["hero"],
            ContentSection::Features => &["feature"],
            ContentSection::Testimonials => &["testimonial", "review"],
            ContentSection::Pricing => &["pricing", "price"],
            ContentSection::Faq => &["faq"],
            ContentSection::Cta => &["cta", "call-to-action"],
            ContentSection::Footer => &["footer"],
        }
    }

    /// Content field → props it is written to
    fn aliases(&self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            ContentSection::Hero => &[
                ("headline", &["headline", "title"]),
                ("subheadline", &["subheadline", "subtitle", "description"]),
                ("ctaPrimary", &["ctaText", "primaryCta", "buttonText"]),
                ("ctaSecondary", &["secondaryCta", "secondaryButtonText"]),
                ("image", &["image", "imageUrl"]),
            ],
            ContentSection::Features => &[
                ("title", &["title", "heading"]),
                ("subtitle", &["subtitle", "description"]),
                ("items", &["items", "features"]),
            ],
            ContentSection::Testimonials => &[
                ("title", &["title", "heading"]),
                ("items", &["items", "testimonials"]),
            ],
            ContentSection::Pricing => &[
                ("title", &["title", "heading"]),
                ("subtitle", &["subtitle", "description"]),
                ("plans", &["plans", "tiers"]),
            ],
            ContentSection::Faq => &[
                ("title", &["title", "heading"]),
                ("items", &["items", "questions"]),
            ],
            ContentSection::Cta => &[
                ("headline", &["headline", "title"]),
                ("subheadline", &["subheadline", "description"]),
                ("button", &["ctaText", "buttonText"]),
            ],
            ContentSection::Footer => &[
                ("tagline", &["tagline", "description"]),
                ("links", &["links"]),
                ("copyright", &["copyright"]),
            ],
        }
    }

    /// Fields that must hold a list when present
    fn list_fields(&self) -> &'static [&'static str] {
        match self {
            ContentSection::Features
            | ContentSection::Testimonials
            | ContentSection::Faq => &["items"],
            ContentSection::Pricing => &["plans"],
            ContentSection::Footer => &["links"],
            ContentSection::Hero | ContentSection::Cta => &[],
        }
    }

    /// First section whose match terms appear in `family_name`
    pub fn for_family(family_name: &str) -> Option<ContentSection> {
        let name = family_name.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.match_terms().iter().any(|term| name.contains(term)))
    }
}

/// A placeholder name defined by more than one section, by section key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderCollision {
    pub field: String,
    pub used: String,
    pub shadowed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentImport {
    pub patches: Vec<PropPatch>,
    pub collisions: Vec<PlaceholderCollision>,
}

#[derive(Debug, Clone, PartialEq)]
struct Section {
    key: String,
    /// `None` for sections with no prop mapping, used only by placeholders
    kind: Option<ContentSection>,
    fields: Map<String, Value>,
}

/// Validated content document, sections kept in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentBridge {
    sections: Vec<Section>,
}

/// `ctaPrimary` → `cta_primary`
fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// A section field under its own name or its snake_case spelling
fn field<'v>(fields: &'v Map<String, Value>, name: &str) -> Option<&'v Value> {
    fields.get(name).or_else(|| fields.get(&snake_case(name)))
}

impl ContentBridge {
    pub fn from_json(json: &str) -> BindingResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Check the document shape, reporting every problem at once
    pub fn from_value(value: Value) -> BindingResult<Self> {
        let mut issues = IssueCollector::new();

        let Value::Object(mut root) = value else {
            return Err(ValidationError::single(ValidationIssue::invalid(
                "",
                "content document must be an object",
            ))
            .into());
        };

        let mut sections = Vec::new();
        for section in ContentSection::ALL {
            let Some(value) = root.remove(section.key()) else {
                continue;
            };
            let Value::Object(fields) = value else {
                issues.push(ValidationIssue::invalid(section.key(), "section must be an object"));
                continue;
            };

            for (name, _) in section.aliases() {
                if let Some(value) = field(&fields, name) {
                    let is_list = section.list_fields().contains(name);
                    if is_list && !value.is_array() {
                        issues.push(ValidationIssue::invalid(
                            format!("{}.{}", section.key(), name),
                            "expected a list",
                        ));
                    } else if !is_list && !(value.is_string() || value.is_number()) {
                        issues.push(ValidationIssue::invalid(
                            format!("{}.{}", section.key(), name),
                            "expected text",
                        ));
                    }
                }
            }
            sections.push(Section {
                key: section.key().to_string(),
                kind: Some(section),
                fields,
            });
        }

        // remaining keys are not known sections
        for (key, value) in root {
            match value {
                Value::Object(fields) => {
                    tracing::debug!("Keeping {} as a placeholder-only section", key);
                    sections.push(Section {
                        key,
                        kind: None,
                        fields,
                    });
                }
                _ => tracing::warn!("Ignoring {}: not a section object", key),
            }
        }

        let bridge = issues.finish(Self { sections })?;
        Ok(bridge)
    }

    /// Known sections present in the document
    pub fn sections(&self) -> impl Iterator<Item = ContentSection> + '_ {
        self.sections.iter().filter_map(|s| s.kind)
    }

    /// Keys of every kept section, known or not, in lookup order
    pub fn section_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections.iter().map(|s| s.key.as_str())
    }

    fn section(&self, section: ContentSection) -> Option<&Map<String, Value>> {
        self.sections
            .iter()
            .find(|s| s.kind == Some(section))
            .map(|s| &s.fields)
    }

    /// First section (document order) defining `name`, plus any it shadows
    fn lookup(&self, name: &str) -> Option<(&Value, &str, Vec<String>)> {
        let mut defining = self
            .sections
            .iter()
            .filter_map(|s| field(&s.fields, name).map(|v| (s.key.as_str(), v)));
        let (used, value) = defining.next()?;
        let shadowed = defining.map(|(key, _)| key.to_string()).collect();
        Some((value, used, shadowed))
    }

    /// Compute patches for `instances`. Nothing is committed.
    pub fn apply<'a>(
        &self,
        registry: &Registry,
        instances: impl IntoIterator<Item = &'a ComponentInstance> + Clone,
    ) -> ContentImport {
        let mut patches = Vec::new();

        for instance in instances.clone() {
            let Some(entry) = registry.get_by_id(&instance.registry_id) else {
                continue;
            };
            let Some(section) = ContentSection::for_family(&entry.family_name()) else {
                continue;
            };
            let Some(fields) = self.section(section) else {
                continue;
            };

            let mut patch = PropPatch::new(instance.id.clone());
            for (name, props) in section.aliases() {
                let Some(value) = field(fields, name) else {
                    continue;
                };
                for prop in *props {
                    if instance.props.get(prop) != Some(value) {
                        patch.props.insert(prop.to_string(), value.clone());
                    }
                }
            }
            tracing::debug!(
                "Mapped {} section onto {} ({} prop(s))",
                section.key(),
                instance.id,
                patch.props.len()
            );
            patches.push(patch);
        }

        let mut collisions: BTreeMap<String, PlaceholderCollision> = BTreeMap::new();
        let placeholder_patches = resolve_placeholders(instances, |_, name| {
            let (value, used, shadowed) = self.lookup(name)?;
            if !shadowed.is_empty() && !collisions.contains_key(name) {
                tracing::warn!(
                    "Placeholder {{{}}} is defined by {} and {}; using {}",
                    name,
                    used,
                    shadowed.join(", "),
                    used
                );
                collisions.insert(
                    name.to_string(),
                    PlaceholderCollision {
                        field: name.to_string(),
                        used: used.to_string(),
                        shadowed,
                    },
                );
            }
            Some(value.clone())
        });
        patches.extend(placeholder_patches);

        ContentImport {
            patches: merge_patches(patches),
            collisions: collisions.into_values().collect(),
        }
    }
}
