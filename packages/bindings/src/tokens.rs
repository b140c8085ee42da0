//! # Design-Token Bridge
//!
//! Maps a brand export document onto a project's [`DesignSystem`].
//!
//! ```json
//! {
//!   "project": { "name": "Acme", "description": "..." },
//!   "brand": {
//!     "colors": { "primary": "#1e3a8a", "accent": "#f59e0b" },
//!     "typography": { "headingFont": "Inter", "bodyFont": "Inter" },
//!     "spacing": { "md": "1rem" },
//!     "radius": { "md": "0.5rem" }
//!   }
//! }
//! ```
//!
//! Derived colors:
//! - `<color>Foreground` for every base color without one
//! - `secondary` and `muted` lightened from `primary` when absent

use crate::color::{foreground_for, lighten, Rgb};
use crate::error::BindingResult;
use crate::placeholder::{resolve_placeholders, PropPatch};
use pagewright_common::{get_scope_id, IssueCollector, ValidationIssue};
use pagewright_model::{ComponentInstance, DesignSystem, TokenGroup};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

const FOREGROUND_SUFFIX: &str = "Foreground";
const SECONDARY_LIGHTEN: f64 = 0.75;
const MUTED_LIGHTEN: f64 = 0.9;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDocument {
    #[serde(default)]
    pub project: Option<ProjectInfo>,
    #[serde(default)]
    pub brand: Option<Brand>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(default)]
    pub colors: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub typography: Option<Typography>,
    #[serde(default)]
    pub spacing: Option<BTreeMap<String, String>>,
    #[serde(default, alias = "borderRadius")]
    pub radius: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub shadows: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default)]
    pub heading_font: Option<String>,
    #[serde(default)]
    pub body_font: Option<String>,
    /// Any further typography tokens (`monoFont`, `baseSize`, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TokenDocument {
    pub fn from_json(json: &str) -> BindingResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Output of a token import: the new design system and the prop patches it
/// implies. Nothing is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenImport {
    pub design_system: DesignSystem,
    pub patches: Vec<PropPatch>,
}

pub struct DesignTokenBridge;

impl DesignTokenBridge {
    /// Validate `doc` and build the project's design system.
    ///
    /// Every missing or malformed field is reported in one error.
    pub fn to_design_system(doc: &TokenDocument, project_id: &str) -> BindingResult<DesignSystem> {
        let mut issues = IssueCollector::new();

        let name = doc
            .project
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty());
        if name.is_none() {
            issues.push(ValidationIssue::missing("project.name"));
        }

        let brand = doc.brand.clone().unwrap_or_default();

        let base_colors = brand.colors.clone().unwrap_or_default();
        if base_colors.is_empty() {
            issues.push(ValidationIssue::missing("brand.colors"));
        }
        for (key, value) in &base_colors {
            if looks_like_hex(value) && Rgb::from_hex(value).is_none() {
                issues.push(ValidationIssue::invalid(
                    format!("brand.colors.{}", key),
                    format!("`{}` is not a valid hex color", value),
                ));
            }
        }

        let typography = brand.typography.clone().unwrap_or_default();
        let heading_font = non_empty(typography.heading_font.as_deref());
        let body_font = non_empty(typography.body_font.as_deref());
        if heading_font.is_none() {
            issues.push(ValidationIssue::missing("brand.typography.headingFont"));
        }
        if body_font.is_none() {
            issues.push(ValidationIssue::missing("brand.typography.bodyFont"));
        }

        issues.finish(())?;

        let fallback = DesignSystem::fallback(project_id);
        let mut typography_tokens = BTreeMap::new();
        for (key, value) in &typography.extra {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            typography_tokens.insert(key.clone(), text);
        }
        if let Some(font) = heading_font {
            typography_tokens.insert("headingFont".to_string(), font.to_string());
        }
        if let Some(font) = body_font {
            typography_tokens.insert("bodyFont".to_string(), font.to_string());
        }

        let design = DesignSystem {
            id: format!("ds-{}", get_scope_id(project_id)),
            project_id: project_id.to_string(),
            name: name.unwrap_or_default().to_string(),
            colors: derive_colors(base_colors),
            typography: typography_tokens,
            spacing: brand.spacing.unwrap_or(fallback.spacing),
            border_radius: brand.radius.unwrap_or(fallback.border_radius),
            shadows: brand.shadows,
        };

        tracing::info!(
            "Built design system for {} with {} token(s)",
            project_id,
            design.tokens().len()
        );
        Ok(design)
    }

    /// Patches for props whose value is `"{tokenName}"`.
    ///
    /// A bare name is looked up group by group (colors first); `group.key`
    /// addresses one group directly.
    pub fn patches<'a>(
        design: &DesignSystem,
        instances: impl IntoIterator<Item = &'a ComponentInstance>,
    ) -> Vec<PropPatch> {
        resolve_placeholders(instances, |_, name| {
            resolve_token(design, name).map(|v| Value::String(v.to_string()))
        })
    }

    pub fn import<'a>(
        doc: &TokenDocument,
        project_id: &str,
        instances: impl IntoIterator<Item = &'a ComponentInstance>,
    ) -> BindingResult<TokenImport> {
        let design_system = Self::to_design_system(doc, project_id)?;
        let patches = Self::patches(&design_system, instances);
        Ok(TokenImport {
            design_system,
            patches,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn looks_like_hex(value: &str) -> bool {
    value.trim_start().starts_with('#')
}

fn derive_colors(mut colors: BTreeMap<String, String>) -> BTreeMap<String, String> {
    if let Some(primary) = colors.get("primary").cloned() {
        for (key, amount) in [("secondary", SECONDARY_LIGHTEN), ("muted", MUTED_LIGHTEN)] {
            if !colors.contains_key(key) {
                if let Some(derived) = lighten(&primary, amount) {
                    colors.insert(key.to_string(), derived);
                }
            }
        }
    }

    let bases: Vec<(String, String)> = colors
        .iter()
        .filter(|(key, _)| !key.ends_with(FOREGROUND_SUFFIX))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    for (key, value) in bases {
        let foreground_key = format!("{}{}", key, FOREGROUND_SUFFIX);
        if colors.contains_key(&foreground_key) {
            continue;
        }
        if let Some(foreground) = foreground_for(&value) {
            colors.insert(foreground_key, foreground.to_string());
        }
    }
    colors
}

fn resolve_token<'a>(design: &'a DesignSystem, name: &str) -> Option<&'a str> {
    if let Some((group, key)) = name.split_once('.') {
        if let Ok(group) = group.parse::<TokenGroup>() {
            return design.lookup(group, key);
        }
    }
    TokenGroup::ALL
        .iter()
        .find_map(|group| design.lookup(*group, name))
}
