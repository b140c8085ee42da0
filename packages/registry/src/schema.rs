use pagewright_common::ValidationIssue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared type of a prop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropType {
    String,
    Number,
    Boolean,
    Color,
    Image,
    Url,
    RichText,
    Enum,
    Array,
    Object,
}

/// One entry of a component's ordered prop schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropField {
    pub name: String,
    #[serde(rename = "type")]
    pub prop_type: PropType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Allowed values for `enum` props
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl PropField {
    pub fn new(name: impl Into<String>, prop_type: PropType) -> Self {
        Self {
            name: name.into(),
            prop_type,
            default: None,
            required: false,
            group: None,
            options: Vec::new(),
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Check a value against the declared type.
    ///
    /// `null` is accepted for any optional prop. String-typed props also
    /// accept `{placeholder}` text, which binding resolution fills later.
    pub fn check(&self, value: &Value, path: &str) -> Option<ValidationIssue> {
        if value.is_null() {
            return if self.required {
                Some(ValidationIssue::missing(path))
            } else {
                None
            };
        }

        let ok = match self.prop_type {
            PropType::String | PropType::RichText | PropType::Image | PropType::Url => {
                value.is_string()
            }
            PropType::Color => value.as_str().map(is_color_like).unwrap_or(false),
            PropType::Number => value.is_number(),
            PropType::Boolean => value.is_boolean(),
            PropType::Enum => match value.as_str() {
                Some(s) => self.options.is_empty() || self.options.iter().any(|o| o == s),
                None => false,
            },
            PropType::Array => value.is_array(),
            PropType::Object => value.is_object(),
        };

        if ok {
            None
        } else {
            Some(ValidationIssue::invalid(
                path,
                format!("expected {:?}, got {}", self.prop_type, describe(value)),
            ))
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Hex, functional or named colors, token references and placeholders
fn is_color_like(s: &str) -> bool {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    s.starts_with("rgb")
        || s.starts_with("hsl")
        || s.starts_with("var(")
        || s.starts_with('{')
        || (!s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_checks() {
        let color = PropField::new("accent", PropType::Color);
        assert!(color.check(&json!("#ff00aa"), "accent").is_none());
        assert!(color.check(&json!("{primary}"), "accent").is_none());
        assert!(color.check(&json!("#zz0000"), "accent").is_some());
        assert!(color.check(&json!(12), "accent").is_some());

        let count = PropField::new("count", PropType::Number);
        assert!(count.check(&json!(3), "count").is_none());
        assert!(count.check(&json!("3"), "count").is_some());
    }

    #[test]
    fn test_enum_options_and_required_null() {
        let mut variant = PropField::new("variant", PropType::Enum).required();
        variant.options = vec!["solid".to_string(), "ghost".to_string()];

        assert!(variant.check(&json!("ghost"), "variant").is_none());
        assert!(variant.check(&json!("outline"), "variant").is_some());
        assert!(variant.check(&Value::Null, "variant").is_some());
    }

    #[test]
    fn test_schema_json_shape() {
        let field: PropField = serde_json::from_value(json!({
            "name": "headline",
            "type": "string",
            "default": "Hello",
            "required": true,
            "group": "content"
        }))
        .unwrap();

        assert_eq!(field.prop_type, PropType::String);
        assert_eq!(field.default, Some(json!("Hello")));
        assert_eq!(field.group.as_deref(), Some("content"));
    }
}
