//! Design token substitution and the generated tokens stylesheet.
//!
//! Emitted text may reference tokens as `{{token.<group>.<key>}}`. The
//! replacement is purely textual.

use crate::context::CodeWriter;
use crate::error::ExportProblem;
use pagewright_model::{DesignSystem, TokenGroup};
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*token\.([A-Za-z]+)\.([A-Za-z0-9_\-]+)\s*\}\}")
            .expect("token pattern is valid")
    })
}

/// Replace every token reference in `text`.
///
/// References that do not resolve are left in place and reported against
/// `path`.
pub fn substitute_tokens(
    text: &str,
    path: &str,
    design: &DesignSystem,
    problems: &mut Vec<ExportProblem>,
) -> String {
    if !text.contains("{{") {
        return text.to_string();
    }

    token_regex()
        .replace_all(text, |caps: &Captures| {
            let value = caps[1]
                .parse::<TokenGroup>()
                .ok()
                .and_then(|group| design.lookup(group, &caps[2]));
            match value {
                Some(value) => value.to_string(),
                None => {
                    let token = format!("{}.{}", &caps[1], &caps[2]);
                    tracing::debug!("{}: unknown token {}", path, token);
                    problems.push(ExportProblem::UnknownToken {
                        token,
                        path: path.to_string(),
                    });
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Substitute tokens inside every string of a JSON value
pub fn substitute_value(
    value: &mut Value,
    path: &str,
    design: &DesignSystem,
    problems: &mut Vec<ExportProblem>,
) {
    match value {
        Value::String(text) => {
            if text.contains("{{") {
                *text = substitute_tokens(text, path, design, problems);
            }
        }
        Value::Array(items) => {
            for item in items {
                substitute_value(item, path, design, problems);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                substitute_value(item, path, design, problems);
            }
        }
        _ => {}
    }
}

/// `:root` custom properties for every token, e.g. `--color-primary`
pub fn tokens_css(design: &DesignSystem) -> String {
    let writer = CodeWriter::new();
    writer.add_line(&format!("/* {} */", design.name));
    writer.add_line(":root {");
    writer.indent();
    for (group, key, value) in design.tokens() {
        writer.add_line(&format!("--{}-{}: {};", group.css_prefix(), kebab(key), value));
    }
    writer.dedent();
    writer.add_line("}");
    writer.add_line("");

    writer.add_line("body {");
    writer.indent();
    if design.body_font().is_some() {
        writer.add_line("font-family: var(--font-body-font), sans-serif;");
    }
    if design.colors.contains_key("background") {
        writer.add_line("background-color: var(--color-background);");
    }
    if design.colors.contains_key("foreground") {
        writer.add_line("color: var(--color-foreground);");
    }
    writer.dedent();
    writer.add_line("}");

    if design.heading_font().is_some() {
        writer.add_line("");
        writer.add_line("h1, h2, h3, h4, h5, h6 {");
        writer.indent();
        writer.add_line("font-family: var(--font-heading-font), sans-serif;");
        writer.dedent();
        writer.add_line("}");
    }
    writer.get_output()
}

/// `primaryForeground` → `primary-foreground`
fn kebab(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution_reports_unknown() {
        let design = DesignSystem::fallback("proj");
        let mut problems = Vec::new();
        let out = substitute_tokens(
            "color: {{token.colors.primary}}; r: {{ token.radius.md }}; x: {{token.colors.brand}}",
            "src/a.tsx",
            &design,
            &mut problems,
        );

        assert_eq!(out, "color: #171717; r: 0.5rem; x: {{token.colors.brand}}");
        assert_eq!(
            problems,
            vec![ExportProblem::UnknownToken {
                token: "colors.brand".to_string(),
                path: "src/a.tsx".to_string(),
            }]
        );
    }

    #[test]
    fn test_value_substitution_keeps_json_intact() {
        let mut design = DesignSystem::fallback("proj");
        design
            .typography
            .insert("bodyFont".to_string(), "\"Inter\", sans-serif".to_string());
        let mut value = serde_json::json!({"props": {"font": "{{token.typography.bodyFont}}", "n": 1}});
        let mut problems = Vec::new();
        substitute_value(&mut value, "data.json", &design, &mut problems);

        assert!(problems.is_empty());
        assert_eq!(value["props"]["font"], "\"Inter\", sans-serif");
    }

    #[test]
    fn test_tokens_css() {
        let css = tokens_css(&DesignSystem::fallback("proj"));
        assert!(css.contains("  --color-primary-foreground: #ffffff;\n"));
        assert!(css.contains("--radius-md: 0.5rem;"));
        assert!(css.contains("font-family: var(--font-heading-font), sans-serif;"));
    }
}
