use std::fmt;

/// External package reference, `name` or `name@version`.
///
/// Scoped names keep their leading `@`: `@radix-ui/react-slot@^1.0.2`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

impl PackageSpec {
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        let (scope_at, rest) = match spec.strip_prefix('@') {
            Some(rest) => ("@", rest),
            None => ("", spec),
        };

        match rest.split_once('@') {
            Some((name, version)) if !version.is_empty() => Self {
                name: format!("{}{}", scope_at, name),
                version: Some(version.to_string()),
            },
            _ => Self {
                name: format!("{}{}", scope_at, rest.trim_end_matches('@')),
                version: None,
            },
        }
    }

    /// Package name for an import specifier (`lodash/merge` → `lodash`)
    pub fn name_from_import(specifier: &str) -> Option<String> {
        if specifier.starts_with('.') || specifier.starts_with('/') || specifier.starts_with("@/") {
            return None;
        }

        let mut parts = specifier.split('/');
        let first = parts.next()?;
        if first.is_empty() {
            return None;
        }

        if first.starts_with('@') {
            let second = parts.next()?;
            Some(format!("{}/{}", first, second))
        } else {
            Some(first.to_string())
        }
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}
