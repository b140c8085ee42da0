//! Generated project files.
//!
//! Layout of an exported project:
//!
//! ```text
//! index.html
//! package.json, tsconfig.json, vite.config.ts
//! src/main.tsx            entry; mounts the page or the router
//! src/router.tsx          multi-page exports only
//! src/pages/<Name>.tsx    one module per page
//! src/page-data/<slug>.json
//! src/styles/tokens.css
//! src/components/...      component and shared modules, verbatim paths
//! ```

use crate::context::CodeWriter;
use crate::imports::MODULE_EXTENSIONS;
use pagewright_model::{ComponentInstance, Page, PageSnapshot};
use pagewright_registry::to_pascal_case;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const TOKENS_CSS_PATH: &str = "src/styles/tokens.css";
pub const MAIN_PATH: &str = "src/main.tsx";
pub const ROUTER_PATH: &str = "src/router.tsx";

/// Build tooling pinned in every generated `package.json`
const DEV_DEPENDENCIES: [(&str, &str); 5] = [
    ("@types/react", "^18.2.0"),
    ("@types/react-dom", "^18.2.0"),
    ("@vitejs/plugin-react", "^4.2.0"),
    ("typescript", "^5.3.0"),
    ("vite", "^5.0.0"),
];

/// Where a page's generated files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    pub component_name: String,
    pub module_path: String,
    pub data_path: String,
    pub route: String,
}

impl PageTarget {
    pub fn for_page(page: &Page) -> Self {
        let slug = page.slug.trim_matches('/').replace('/', "-");
        let slug = if slug.is_empty() { "index".to_string() } else { slug };

        let mut base = to_pascal_case(&slug);
        if base.is_empty() || base.starts_with(|c: char| c.is_ascii_digit()) {
            base = format!("P{}", base);
        }
        let component_name = format!("{}Page", base);

        Self {
            module_path: format!("src/pages/{}.tsx", component_name),
            data_path: format!("src/page-data/{}.json", slug),
            route: page.route(),
            component_name,
        }
    }
}

/// A component as seen from a generated page module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef {
    pub export_name: String,
    pub module_path: String,
}

/// `src/components/x/hero.tsx` → `@/components/x/hero`
pub fn import_specifier(module_path: &str) -> String {
    let mut path = module_path;
    for ext in MODULE_EXTENSIONS {
        if let Some(stripped) = path.strip_suffix(&format!(".{}", ext)) {
            path = stripped;
            break;
        }
    }
    match path.strip_prefix("src/") {
        Some(rest) => format!("@/{}", rest),
        None => format!("../../{}", path),
    }
}

/// `background-color` → `backgroundColor`
pub fn style_key(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let mut out = String::with_capacity(property.len());
    let mut upper = false;
    for c in property.chars() {
        if c == '-' {
            upper = !out.is_empty();
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Serialized description of one page: route info plus every rendered
/// instance's configuration, keyed by instance id
pub fn page_data(
    target: &PageTarget,
    page: &Page,
    instances: &[&ComponentInstance],
    overrides: &BTreeMap<String, Value>,
) -> Value {
    let mut data = serde_json::Map::new();
    for instance in instances {
        let mut entry = json!({
            "registryId": instance.registry_id,
            "props": instance.props.to_json(),
        });

        let mut style = serde_json::Map::new();
        if let Some(styles) = &instance.styles {
            for (property, value) in styles {
                style.insert(style_key(property), Value::String(value.clone()));
            }
        }
        if let Some(Value::Object(bound)) = overrides.get(&instance.id).and_then(|o| o.get("style")) {
            for (property, value) in bound {
                style.insert(style_key(property), value.clone());
            }
        }
        if !style.is_empty() {
            entry["style"] = Value::Object(style);
        }
        if let Some(responsive) = &instance.responsive_styles {
            entry["responsiveStyles"] = json!(responsive);
        }
        if let Some(Value::Object(bound)) = overrides.get(&instance.id).and_then(|o| o.get("props")) {
            for (key, value) in bound {
                entry["props"][key] = value.clone();
            }
        }
        data.insert(instance.id.clone(), entry);
    }

    json!({
        "page": {
            "id": page.id,
            "name": page.name,
            "slug": page.slug,
            "route": target.route,
        },
        "instances": Value::Object(data),
    })
}

/// Page module rendering the visible instance tree
pub fn page_module(
    target: &PageTarget,
    visible: &[&ComponentInstance],
    components: &BTreeMap<String, ComponentRef>,
) -> String {
    // one local name per registry entry, aliased on clashes
    let mut names: BTreeMap<&str, String> = BTreeMap::new();
    let mut imports: Vec<(String, String, String)> = Vec::new();
    for instance in visible {
        let Some(component) = components.get(&instance.registry_id) else {
            continue;
        };
        if names.contains_key(instance.registry_id.as_str()) {
            continue;
        }
        let mut local = component.export_name.clone();
        let mut n = 2;
        while imports.iter().any(|(_, l, _)| *l == local) || local == target.component_name {
            local = format!("{}{}", component.export_name, n);
            n += 1;
        }
        imports.push((
            component.export_name.clone(),
            local.clone(),
            import_specifier(&component.module_path),
        ));
        names.insert(instance.registry_id.as_str(), local);
    }

    let writer = CodeWriter::new();
    writer.add_line("import type { CSSProperties } from \"react\";");
    for (export_name, local, specifier) in &imports {
        if export_name == local {
            writer.add_line(&format!("import {{ {} }} from \"{}\";", export_name, specifier));
        } else {
            writer.add_line(&format!(
                "import {{ {} as {} }} from \"{}\";",
                export_name, local, specifier
            ));
        }
    }
    writer.add_line(&format!("import data from \"{}\";", import_specifier(&target.data_path)));
    writer.add_line("");
    writer.add_line("type InstanceData = {");
    writer.indent();
    writer.add_line("props: Record<string, unknown>;");
    writer.add_line("style?: CSSProperties;");
    writer.dedent();
    writer.add_line("};");
    writer.add_line("");
    writer.add_line("const instances = data.instances as unknown as Record<string, InstanceData>;");
    writer.add_line("");
    writer.add_line(&format!("export default function {}() {{", target.component_name));
    writer.indent();
    writer.add_line("return (");
    writer.indent();
    writer.add_line("<>");
    writer.indent();
    let body = writer.with_new_buffer();
    render_children(&body, visible, None, &names);
    writer.merge_buffer(&body);
    writer.dedent();
    writer.add_line("</>");
    writer.dedent();
    writer.add_line(");");
    writer.dedent();
    writer.add_line("}");
    writer.get_output()
}

fn render_children(
    writer: &CodeWriter,
    visible: &[&ComponentInstance],
    parent: Option<&str>,
    names: &BTreeMap<&str, String>,
) {
    for child in PageSnapshot::visible_children(visible, parent) {
        let Some(name) = names.get(child.registry_id.as_str()) else {
            continue;
        };
        let key = Value::String(child.id.clone()).to_string();
        let attrs = format!(
            "{{...instances[{key}].props}} style={{instances[{key}].style}}",
            key = key
        );

        let has_children = visible.iter().any(|i| i.parent_id.as_deref() == Some(&child.id));
        if has_children {
            writer.add_line(&format!("<{} {}>", name, attrs));
            writer.indent();
            render_children(writer, visible, Some(&child.id), names);
            writer.dedent();
            writer.add_line(&format!("</{}>", name));
        } else {
            writer.add_line(&format!("<{} {} />", name, attrs));
        }
    }
}

/// Entry module: mounts the single page, or the router for several
pub fn main_module(pages: &[PageTarget]) -> String {
    let writer = CodeWriter::new();
    writer.add_line("import React from \"react\";");
    writer.add_line("import ReactDOM from \"react-dom/client\";");
    writer.add_line("import \"./styles/tokens.css\";");

    let root = match pages {
        [single] => {
            writer.add_line(&format!(
                "import {} from \"{}\";",
                single.component_name,
                import_specifier(&single.module_path)
            ));
            single.component_name.clone()
        }
        _ => {
            writer.add_line("import Router from \"./router\";");
            "Router".to_string()
        }
    };

    writer.add_line("");
    writer.add_line("ReactDOM.createRoot(document.getElementById(\"root\")!).render(");
    writer.indent();
    writer.add_line("<React.StrictMode>");
    writer.indent();
    writer.add_line(&format!("<{} />", root));
    writer.dedent();
    writer.add_line("</React.StrictMode>");
    writer.dedent();
    writer.add_line(");");
    writer.get_output()
}

/// Path-based page switch; unknown paths fall back to the first page
pub fn router_module(pages: &[PageTarget]) -> String {
    let writer = CodeWriter::new();
    for page in pages {
        writer.add_line(&format!(
            "import {} from \"{}\";",
            page.component_name,
            import_specifier(&page.module_path)
        ));
    }
    writer.add_line("");
    writer.add_line("const routes: Record<string, () => JSX.Element> = {");
    writer.indent();
    for page in pages {
        writer.add_line(&format!(
            "{}: {},",
            Value::String(page.route.clone()),
            page.component_name
        ));
    }
    writer.dedent();
    writer.add_line("};");
    writer.add_line("");
    writer.add_line("export default function Router() {");
    writer.indent();
    if let Some(first) = pages.first() {
        writer.add_line(&format!(
            "const Page = routes[window.location.pathname] ?? routes[{}];",
            Value::String(first.route.clone())
        ));
    }
    writer.add_line("return <Page />;");
    writer.dedent();
    writer.add_line("}");
    writer.get_output()
}

pub fn index_html(title: &str) -> String {
    let writer = CodeWriter::new();
    writer.add_line("<!doctype html>");
    writer.add_line("<html lang=\"en\">");
    writer.indent();
    writer.add_line("<head>");
    writer.indent();
    writer.add_line("<meta charset=\"UTF-8\" />");
    writer.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />");
    writer.add_line(&format!("<title>{}</title>", escape_html(title)));
    writer.dedent();
    writer.add_line("</head>");
    writer.add_line("<body>");
    writer.indent();
    writer.add_line("<div id=\"root\"></div>");
    writer.add_line("<script type=\"module\" src=\"/src/main.tsx\"></script>");
    writer.dedent();
    writer.add_line("</body>");
    writer.dedent();
    writer.add_line("</html>");
    writer.get_output()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn vite_config() -> String {
    let writer = CodeWriter::new();
    writer.add_line("import { defineConfig } from \"vite\";");
    writer.add_line("import react from \"@vitejs/plugin-react\";");
    writer.add_line("import path from \"path\";");
    writer.add_line("");
    writer.add_line("export default defineConfig({");
    writer.indent();
    writer.add_line("plugins: [react()],");
    writer.add_line("resolve: {");
    writer.indent();
    writer.add_line("alias: {");
    writer.indent();
    writer.add_line("\"@\": path.resolve(__dirname, \"./src\"),");
    writer.dedent();
    writer.add_line("},");
    writer.dedent();
    writer.add_line("},");
    writer.dedent();
    writer.add_line("});");
    writer.get_output()
}

pub fn tsconfig() -> Value {
    json!({
        "compilerOptions": {
            "target": "ES2020",
            "lib": ["ES2020", "DOM", "DOM.Iterable"],
            "module": "ESNext",
            "moduleResolution": "bundler",
            "jsx": "react-jsx",
            "strict": true,
            "resolveJsonModule": true,
            "isolatedModules": true,
            "noEmit": true,
            "skipLibCheck": true,
            "baseUrl": ".",
            "paths": { "@/*": ["./src/*"] }
        },
        "include": ["src"]
    })
}

/// npm package name derived from the project name
pub fn package_name(project_name: &str) -> String {
    let mut name = String::new();
    for c in project_name.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else if !name.ends_with('-') {
            name.push('-');
        }
    }
    let name = name.trim_matches('-');
    if name.is_empty() {
        "pagewright-site".to_string()
    } else {
        name.to_string()
    }
}

pub fn package_json(project_name: &str, dependencies: &BTreeMap<String, String>) -> Value {
    let dev: BTreeMap<&str, &str> = DEV_DEPENDENCIES.into_iter().collect();
    json!({
        "name": package_name(project_name),
        "private": true,
        "version": "0.0.0",
        "type": "module",
        "scripts": {
            "dev": "vite",
            "build": "tsc && vite build",
            "preview": "vite preview"
        },
        "dependencies": dependencies,
        "devDependencies": dev,
    })
}
