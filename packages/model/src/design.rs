//! Project-wide design tokens.
//!
//! A design system is a flat, versionless record. Replacing it replaces every
//! token at once; there is no partial token update.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenGroup {
    Colors,
    Typography,
    Spacing,
    BorderRadius,
    Shadows,
}

impl TokenGroup {
    pub const ALL: [TokenGroup; 5] = [
        TokenGroup::Colors,
        TokenGroup::Typography,
        TokenGroup::Spacing,
        TokenGroup::BorderRadius,
        TokenGroup::Shadows,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenGroup::Colors => "colors",
            TokenGroup::Typography => "typography",
            TokenGroup::Spacing => "spacing",
            TokenGroup::BorderRadius => "borderRadius",
            TokenGroup::Shadows => "shadows",
        }
    }

    /// Prefix used for CSS custom properties
    pub fn css_prefix(&self) -> &'static str {
        match self {
            TokenGroup::Colors => "color",
            TokenGroup::Typography => "font",
            TokenGroup::Spacing => "spacing",
            TokenGroup::BorderRadius => "radius",
            TokenGroup::Shadows => "shadow",
        }
    }
}

impl FromStr for TokenGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "colors" | "color" => Ok(TokenGroup::Colors),
            "typography" | "fonts" | "font" => Ok(TokenGroup::Typography),
            "spacing" => Ok(TokenGroup::Spacing),
            "borderRadius" | "radius" => Ok(TokenGroup::BorderRadius),
            "shadows" | "shadow" => Ok(TokenGroup::Shadows),
            other => Err(format!("unknown token group `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSystem {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub colors: BTreeMap<String, String>,
    pub typography: BTreeMap<String, String>,
    pub spacing: BTreeMap<String, String>,
    pub border_radius: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadows: Option<BTreeMap<String, String>>,
}

impl DesignSystem {
    pub fn group(&self, group: TokenGroup) -> Option<&BTreeMap<String, String>> {
        match group {
            TokenGroup::Colors => Some(&self.colors),
            TokenGroup::Typography => Some(&self.typography),
            TokenGroup::Spacing => Some(&self.spacing),
            TokenGroup::BorderRadius => Some(&self.border_radius),
            TokenGroup::Shadows => self.shadows.as_ref(),
        }
    }

    pub fn lookup(&self, group: TokenGroup, key: &str) -> Option<&str> {
        self.group(group)?.get(key).map(String::as_str)
    }

    /// Every token as `(group, key, value)` in group order then key order
    pub fn tokens(&self) -> Vec<(TokenGroup, &str, &str)> {
        let mut out = Vec::new();
        for group in TokenGroup::ALL {
            if let Some(values) = self.group(group) {
                for (key, value) in values {
                    out.push((group, key.as_str(), value.as_str()));
                }
            }
        }
        out
    }

    pub fn heading_font(&self) -> Option<&str> {
        self.typography.get("headingFont").map(String::as_str)
    }

    pub fn body_font(&self) -> Option<&str> {
        self.typography.get("bodyFont").map(String::as_str)
    }

    /// Neutral defaults used when a project has no imported token set
    pub fn fallback(project_id: impl Into<String>) -> Self {
        let pairs = |items: &[(&str, &str)]| -> BTreeMap<String, String> {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };

        let project_id = project_id.into();
        Self {
            id: format!("{}-design", project_id),
            project_id,
            name: "Default".to_string(),
            colors: pairs(&[
                ("background", "#ffffff"),
                ("foreground", "#0a0a0a"),
                ("primary", "#171717"),
                ("primaryForeground", "#ffffff"),
                ("secondary", "#f5f5f5"),
                ("secondaryForeground", "#000000"),
                ("muted", "#f5f5f5"),
                ("mutedForeground", "#000000"),
            ]),
            typography: pairs(&[
                ("headingFont", "Inter"),
                ("bodyFont", "Inter"),
            ]),
            spacing: pairs(&[("sm", "0.5rem"), ("md", "1rem"), ("lg", "2rem")]),
            border_radius: pairs(&[("sm", "0.25rem"), ("md", "0.5rem"), ("lg", "1rem")]),
            shadows: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_group() {
        let ds = DesignSystem::fallback("proj");
        assert_eq!(ds.lookup(TokenGroup::Colors, "primary"), Some("#171717"));
        assert_eq!(ds.lookup(TokenGroup::Shadows, "md"), None);
        assert_eq!(ds.heading_font(), Some("Inter"));
        assert_eq!("radius".parse::<TokenGroup>(), Ok(TokenGroup::BorderRadius));
    }

    #[test]
    fn test_tokens_are_ordered_by_group() {
        let ds = DesignSystem::fallback("proj");
        let tokens = ds.tokens();
        assert_eq!(tokens.first().map(|t| t.0), Some(TokenGroup::Colors));
        assert_eq!(tokens.last().map(|t| t.0), Some(TokenGroup::BorderRadius));
    }
}
