//! Import scanning for captured modules.
//!
//! Only the module specifiers are extracted; nothing is parsed beyond the
//! `import ... from "x"`, `export ... from "x"`, `import "x"` and `import("x")`
//! forms.

use pagewright_registry::PackageSpec;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Module extensions tried when resolving an extensionless specifier
pub const MODULE_EXTENSIONS: [&str; 4] = ["tsx", "ts", "jsx", "js"];

/// `@/` maps onto this project-relative directory
pub const ALIAS_ROOT: &str = "src";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleImports {
    /// Captured modules this one imports, as table paths
    #[serde(default)]
    pub shared: Vec<String>,
    /// Bare package names
    #[serde(default)]
    pub packages: Vec<String>,
}

fn import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?m)(?:^|[^\w.])(?:import|export)\s*(?:[\w*{}\s,$]+?\s*from\s*)?['"]([^'"\n]+)['"]|import\(\s*['"]([^'"\n]+)['"]\s*\)"#,
        )
        .expect("import pattern is valid")
    })
}

/// Every module specifier in `source`, in order of appearance, deduplicated
pub fn scan_specifiers(source: &str) -> Vec<String> {
    let mut specifiers: Vec<String> = Vec::new();
    for captures in import_regex().captures_iter(source) {
        let Some(specifier) = captures.get(1).or_else(|| captures.get(2)) else {
            continue;
        };
        let specifier = specifier.as_str().to_string();
        if !specifiers.contains(&specifier) {
            specifiers.push(specifier);
        }
    }
    specifiers
}

/// Candidate table paths for a local specifier imported by `importer`.
///
/// `None` for bare package specifiers.
pub fn local_candidates(specifier: &str, importer: &str) -> Option<Vec<String>> {
    let base = if let Some(rest) = specifier.strip_prefix("@/") {
        format!("{}/{}", ALIAS_ROOT, rest)
    } else if specifier.starts_with("./") || specifier.starts_with("../") {
        let dir = importer.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
        normalize(&format!("{}/{}", dir, specifier))
    } else {
        return None;
    };

    let mut candidates = vec![base.clone()];
    for ext in MODULE_EXTENSIONS {
        candidates.push(format!("{}.{}", base, ext));
    }
    for ext in MODULE_EXTENSIONS {
        candidates.push(format!("{}/index.{}", base, ext));
    }
    Some(candidates)
}

/// Package name for a bare specifier
pub fn package_name(specifier: &str) -> Option<String> {
    if specifier.starts_with("./") || specifier.starts_with("../") {
        return None;
    }
    PackageSpec::name_from_import(specifier)
}

/// Collapse `.` and `..` segments of a `/`-separated path
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_forms() {
        let source = r#"
import * as React from "react"
import { cn } from "@/lib/utils";
import { Slot } from '@radix-ui/react-slot'
export { Button } from "./button"
import "./styles.css";
const Lazy = React.lazy(() => import("./lazy"));
import { cn as again } from "@/lib/utils";
"#;
        assert_eq!(
            scan_specifiers(source),
            vec![
                "react",
                "@/lib/utils",
                "@radix-ui/react-slot",
                "./button",
                "./styles.css",
                "./lazy",
            ]
        );
    }

    #[test]
    fn test_local_candidates() {
        let candidates = local_candidates("../ui/button", "src/components/shadcn/hero.tsx").unwrap();
        assert_eq!(candidates[0], "src/components/ui/button");
        assert!(candidates.contains(&"src/components/ui/button.tsx".to_string()));

        let alias = local_candidates("@/lib/utils", "src/components/shadcn/hero.tsx").unwrap();
        assert!(alias.contains(&"src/lib/utils.ts".to_string()));

        assert_eq!(local_candidates("react", "src/x.tsx"), None);
    }

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("@radix-ui/react-slot"), Some("@radix-ui/react-slot".to_string()));
        assert_eq!(package_name("lucide-react/icons"), Some("lucide-react".to_string()));
        assert_eq!(package_name("@/lib/utils"), None);
        assert_eq!(package_name("./button"), None);
    }
}
