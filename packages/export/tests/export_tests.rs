use pagewright_common::{MockFileSystem, RealFileSystem};
use pagewright_export::{
    index_sources_async, CancellationToken, DeployConfig, Deployer, DirectoryDeployer, ExportEngine,
    ExportError, ExportOptions, ExportProblem, MatchKind, SourceIndexBuilder, SourceIndexOptions,
    SourceTable,
};
use pagewright_model::{
    BindingTarget, CmsBinding, CmsCollection, CmsItem, CmsSnapshot, ComponentInstance, DesignSystem,
    Page, PageSnapshot, PropMap, SourceFamily,
};
use pagewright_registry::{Registry, RegistryEntry, SourceLocator};
use serde_json::{json, Value};
use std::path::PathBuf;

const HERO: &str = r#"import { motion } from "framer-motion";
import { Button } from "@/components/ui/button";

export function Hero({ title }: { title: string }) {
  return (
    <motion.section style={{ color: "{{token.colors.primary}}" }}>
      <Button>{title}</Button>
    </motion.section>
  );
}
"#;

const BUTTON: &str = r#"import { Slot } from "@radix-ui/react-slot";
import { cn } from "@/lib/utils";

export function Button(props: any) {
  return <button className={cn("btn")} {...props} />;
}
"#;

fn registry() -> Registry {
    let hero = RegistryEntry::new("shadcn-hero", "Hero", "shadcn").with_dependency("framer-motion@^11.0.0");
    let grid = RegistryEntry::new("magicui-feature-grid", "Feature Grid", "magicui");
    let mut footer = RegistryEntry::new("shadcn-footer", "Footer", "shadcn");
    footer.source_locator = SourceLocator("file:src/blocks/footer.tsx".to_string());
    let pricing = RegistryEntry::new("shadcn-pricing", "Pricing", "shadcn");
    Registry::new(vec![hero, grid, footer, pricing]).unwrap()
}

fn file_system() -> MockFileSystem {
    let mut fs = MockFileSystem::new();
    fs.add_file("/proj/src/components/shadcn/hero.tsx", HERO);
    fs.add_file(
        "/proj/src/components/magicui/animated-feature-grid.tsx",
        "import { cn } from \"../../lib/utils\";\nexport function FeatureGrid() { return null; }\n",
    );
    fs.add_file(
        "/proj/src/blocks/footer.tsx",
        "import { Mail } from \"lucide-react\";\nexport function Footer() { return null; }\n",
    );
    fs.add_file("/proj/src/components/ui/button.tsx", BUTTON);
    fs.add_file("/proj/src/components/ui/card.tsx", "export function Card() { return null; }\n");
    fs.add_file(
        "/proj/src/lib/utils.ts",
        "import { clsx } from \"clsx\";\nexport const cn = (...c: string[]) => clsx(c);\n",
    );
    fs
}

fn options() -> SourceIndexOptions {
    SourceIndexOptions {
        root: PathBuf::from("/proj"),
        ..SourceIndexOptions::default()
    }
}

fn table() -> SourceTable {
    let fs = file_system();
    SourceIndexBuilder::new(&fs, options()).build(&registry()).unwrap()
}

fn instance(id: &str, registry_id: &str, order: i64) -> ComponentInstance {
    ComponentInstance::new(id, "home", registry_id, SourceFamily::from("shadcn"), order)
}

fn home(instances: Vec<ComponentInstance>) -> PageSnapshot {
    PageSnapshot::new(Page::new("home", "proj", "Home", "home", 0), instances)
}

fn page_data(manifest: &pagewright_export::ExportManifest, path: &str) -> Value {
    serde_json::from_str(manifest.file(path).unwrap()).unwrap()
}

#[test]
fn test_index_match_order_and_imports() {
    let table = table();

    assert_eq!(table.components["shadcn-hero"].matched_by, MatchKind::PrefixStripped);
    assert_eq!(table.components["magicui-feature-grid"].matched_by, MatchKind::Fuzzy);
    assert_eq!(table.components["shadcn-footer"].matched_by, MatchKind::Explicit);
    assert_eq!(table.unmatched, vec!["shadcn-pricing"]);

    let button = table.module("src/components/ui/button.tsx").unwrap();
    assert_eq!(button.imports.shared, vec!["src/lib/utils.ts"]);
    assert_eq!(button.imports.packages, vec!["@radix-ui/react-slot"]);

    let grid = table.component("magicui-feature-grid").unwrap();
    assert_eq!(grid.imports.shared, vec!["src/lib/utils.ts"]);
    assert!(table.module("src/components/ui/card.tsx").is_some());
}

#[test]
fn test_source_table_survives_save_and_load() {
    let table = table();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("build/source-table.json");
    table.save(&path).unwrap();
    assert_eq!(SourceTable::load(&path).unwrap(), table);
}

#[test]
fn test_unreadable_source_only_drops_its_own_entry() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("src/components/shadcn")).unwrap();
    std::fs::create_dir_all(root.join("src/lib")).unwrap();
    std::fs::write(
        root.join("src/components/shadcn/hero.tsx"),
        "import { cn } from \"@/lib/utils\";\nimport { Missing } from \"@/lib/broken\";\nexport function Hero() { return null; }\n",
    )
    .unwrap();
    std::fs::write(root.join("src/components/shadcn/card.tsx"), [0xff, 0xfe, 0x00, 0x41]).unwrap();
    std::fs::write(root.join("src/lib/utils.ts"), "export const cn = () => \"\";\n").unwrap();
    std::fs::write(root.join("src/lib/broken.ts"), [0xc3, 0x28]).unwrap();

    let registry = Registry::new(vec![
        RegistryEntry::new("shadcn-hero", "Hero", "shadcn"),
        RegistryEntry::new("shadcn-card", "Card", "shadcn"),
    ])
    .unwrap();
    let options = SourceIndexOptions {
        root: root.to_path_buf(),
        ..SourceIndexOptions::default()
    };

    let table = SourceIndexBuilder::new(&RealFileSystem, options).build(&registry).unwrap();

    assert!(table.components.contains_key("shadcn-hero"));
    assert!(!table.components.contains_key("shadcn-card"));
    assert_eq!(table.failed, vec!["shadcn-card"]);
    assert!(table.unmatched.is_empty());
    assert!(table.module("src/lib/utils.ts").is_some());
    assert!(table.module("src/lib/broken.ts").is_none());
    assert_eq!(table.component("shadcn-hero").unwrap().imports.shared, vec!["src/lib/utils.ts"]);
}

#[test]
fn test_sources_and_dependencies_deduplicated_across_instances() {
    let registry = registry();
    let table = table();
    let engine = ExportEngine::new(&registry, &table, ExportOptions::default());

    let page = home(vec![
        instance("hero-1", "shadcn-hero", 0),
        instance("hero-2", "shadcn-hero", 1),
        instance("hero-3", "shadcn-hero", 2),
    ]);
    let manifest = engine
        .export_page(&page, &DesignSystem::fallback("proj"), &CmsSnapshot::default(), &CancellationToken::new())
        .unwrap();

    let paths: Vec<&str> = manifest.paths().collect();
    assert_eq!(paths.iter().filter(|p| **p == "src/components/shadcn/hero.tsx").count(), 1);
    assert!(paths.contains(&"src/components/ui/button.tsx"));
    assert!(paths.contains(&"src/lib/utils.ts"));
    assert!(!paths.contains(&"src/components/ui/card.tsx"));
    assert!(!paths.contains(&"src/components/magicui/animated-feature-grid.tsx"));

    assert_eq!(manifest.dependencies["framer-motion"], "^11.0.0");
    assert!(manifest.dependencies.contains_key("@radix-ui/react-slot"));
    assert!(manifest.dependencies.contains_key("clsx"));
    assert!(manifest.dependencies.contains_key("react"));

    let module = manifest.file("src/pages/HomePage.tsx").unwrap();
    assert_eq!(module.matches("import { Hero }").count(), 1);
    assert_eq!(module.matches("<Hero ").count(), 3);

    let package: Value = serde_json::from_str(manifest.file("package.json").unwrap()).unwrap();
    assert_eq!(package["dependencies"]["framer-motion"], json!("^11.0.0"));
    assert!(manifest.file("src/router.tsx").is_none());
}

#[test]
fn test_missing_source_names_every_instance() {
    let registry = registry();
    let table = table();
    let engine = ExportEngine::new(&registry, &table, ExportOptions::default());

    let page = home(vec![
        instance("hero-1", "shadcn-hero", 0),
        instance("pricing-1", "shadcn-pricing", 1),
        instance("pricing-2", "shadcn-pricing", 2),
        instance("ghost-1", "not-in-registry", 3),
    ]);
    let err = engine
        .export_page(&page, &DesignSystem::fallback("proj"), &CmsSnapshot::default(), &CancellationToken::new())
        .unwrap_err();

    let ExportError::MissingSource { missing, problems } = err else {
        panic!("expected missing source");
    };
    let ids: Vec<&str> = missing.iter().map(|m| m.instance_id.as_str()).collect();
    assert_eq!(ids, vec!["pricing-1", "pricing-2", "ghost-1"]);
    assert!(problems.is_empty());
}

#[test]
fn test_missing_source_reported_with_token_problems() {
    let registry = registry();
    let mut table = table();
    if let Some(module) = table.modules.get_mut("src/components/shadcn/hero.tsx") {
        module.text = module.text.replace("{{token.colors.primary}}", "{{token.colors.brand}}");
    }
    let engine = ExportEngine::new(&registry, &table, ExportOptions::default());

    let page = home(vec![
        instance("hero-1", "shadcn-hero", 0),
        instance("pricing-1", "shadcn-pricing", 1),
    ]);
    let err = engine
        .export_page(&page, &DesignSystem::fallback("proj"), &CmsSnapshot::default(), &CancellationToken::new())
        .unwrap_err();

    let ExportError::MissingSource { missing, problems } = err else {
        panic!("expected missing source");
    };
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].instance_id, "pricing-1");
    assert_eq!(
        problems,
        vec![ExportProblem::UnknownToken {
            token: "colors.brand".to_string(),
            path: "src/components/shadcn/hero.tsx".to_string(),
        }]
    );
}

#[test]
fn test_tokens_substituted_in_emitted_sources() {
    let registry = registry();
    let table = table();
    let engine = ExportEngine::new(&registry, &table, ExportOptions::default());

    let mut design = DesignSystem::fallback("proj");
    design.colors.insert("primary".to_string(), "#123456".to_string());

    let manifest = engine
        .export_page(
            &home(vec![instance("hero-1", "shadcn-hero", 0)]),
            &design,
            &CmsSnapshot::default(),
            &CancellationToken::new(),
        )
        .unwrap();

    let hero = manifest.file("src/components/shadcn/hero.tsx").unwrap();
    assert!(hero.contains("color: \"#123456\""));
    assert!(manifest
        .file("src/styles/tokens.css")
        .unwrap()
        .contains("--color-primary: #123456;"));
}

#[test]
fn test_unknown_tokens_abort_with_all_problems() {
    let registry = registry();
    let table = table();
    let engine = ExportEngine::new(&registry, &table, ExportOptions::default());

    let props: PropMap = [
        ("accent".to_string(), json!("{{token.colors.brand}}")),
        ("gap".to_string(), json!("{{token.spacing.huge}}")),
    ]
    .into_iter()
    .collect();
    let page = home(vec![instance("hero-1", "shadcn-hero", 0).with_props(props)]);

    let err = engine
        .export_page(&page, &DesignSystem::fallback("proj"), &CmsSnapshot::default(), &CancellationToken::new())
        .unwrap_err();
    let ExportError::Problems(problems) = err else {
        panic!("expected problems");
    };
    assert_eq!(problems.len(), 2);
    assert!(problems.iter().all(|p| matches!(p, ExportProblem::UnknownToken { path, .. } if path == "src/page-data/home.json")));
}

fn cms() -> CmsSnapshot {
    CmsSnapshot {
        collections: vec![CmsCollection {
            id: "posts".to_string(),
            project_id: "proj".to_string(),
            name: "Posts".to_string(),
            slug: "posts".to_string(),
            fields: Vec::new(),
        }],
        items: vec![CmsItem {
            id: "p1".to_string(),
            collection_id: "posts".to_string(),
            order: 0,
            data: [
                ("title".to_string(), json!("From the CMS")),
                ("accent".to_string(), json!("#ff0000")),
            ]
            .into_iter()
            .collect(),
        }],
    }
}

fn binding(field: &str, target_type: BindingTarget, target_key: &str) -> CmsBinding {
    CmsBinding {
        field_slug: field.to_string(),
        collection_id: "posts".to_string(),
        item_id: None,
        target_type,
        target_key: target_key.to_string(),
    }
}

#[test]
fn test_cms_values_injected_into_page_data_only() {
    let registry = registry();
    let table = table();
    let engine = ExportEngine::new(&registry, &table, ExportOptions::default());

    let mut hero = instance("hero-1", "shadcn-hero", 0);
    hero.cms_bindings = vec![
        binding("title", BindingTarget::Prop, "title"),
        binding("accent", BindingTarget::Style, "border-color"),
    ];

    let manifest = engine
        .export_page(&home(vec![hero]), &DesignSystem::fallback("proj"), &cms(), &CancellationToken::new())
        .unwrap();

    let data = page_data(&manifest, "src/page-data/home.json");
    assert_eq!(data["instances"]["hero-1"]["props"]["title"], json!("From the CMS"));
    assert_eq!(data["instances"]["hero-1"]["style"]["borderColor"], json!("#ff0000"));
    assert!(!manifest
        .file("src/components/shadcn/hero.tsx")
        .unwrap()
        .contains("From the CMS"));
}

#[test]
fn test_unresolved_binding_is_a_problem() {
    let registry = registry();
    let table = table();
    let engine = ExportEngine::new(&registry, &table, ExportOptions::default());

    let mut hero = instance("hero-1", "shadcn-hero", 0);
    hero.cms_bindings = vec![binding("body", BindingTarget::Prop, "description")];

    let err = engine
        .export_page(&home(vec![hero]), &DesignSystem::fallback("proj"), &cms(), &CancellationToken::new())
        .unwrap_err();
    let ExportError::Problems(problems) = err else {
        panic!("expected problems");
    };
    assert!(matches!(
        &problems[..],
        [ExportProblem::UnresolvedBinding { instance_id, field_slug, .. }]
            if instance_id == "hero-1" && field_slug == "body"
    ));
}

#[test]
fn test_hidden_instances_skip_render_but_keep_dependencies() {
    let registry = registry();
    let table = table();
    let page = home(vec![
        instance("hero-1", "shadcn-hero", 0),
        instance("footer-1", "shadcn-footer", 1).hidden(),
    ]);
    let design = DesignSystem::fallback("proj");
    let cms = CmsSnapshot::default();

    let engine = ExportEngine::new(&registry, &table, ExportOptions::default());
    let manifest = engine.export_page(&page, &design, &cms, &CancellationToken::new()).unwrap();
    let data = page_data(&manifest, "src/page-data/home.json");
    assert!(data["instances"].get("footer-1").is_none());
    assert!(manifest.contains("src/blocks/footer.tsx"));
    assert!(manifest.dependencies.contains_key("lucide-react"));
    assert!(!manifest.file("src/pages/HomePage.tsx").unwrap().contains("Footer"));

    let excluding = ExportEngine::new(
        &registry,
        &table,
        ExportOptions {
            exclude_hidden: true,
            ..ExportOptions::default()
        },
    );
    let manifest = excluding.export_page(&page, &design, &cms, &CancellationToken::new()).unwrap();
    assert!(!manifest.contains("src/blocks/footer.tsx"));
    assert!(!manifest.dependencies.contains_key("lucide-react"));
}

#[test]
fn test_cancelled_export_returns_nothing() {
    let registry = registry();
    let table = table();
    let engine = ExportEngine::new(&registry, &table, ExportOptions::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = engine.export_page(
        &home(vec![instance("hero-1", "shadcn-hero", 0)]),
        &DesignSystem::fallback("proj"),
        &CmsSnapshot::default(),
        &cancel,
    );
    assert!(matches!(result, Err(ExportError::Cancelled)));
}

#[test]
fn test_project_export_routes_every_page() {
    let registry = registry();
    let table = table();
    let engine = ExportEngine::new(&registry, &table, ExportOptions::default());

    let about = PageSnapshot::new(
        Page::new("about", "proj", "About", "about", 1),
        vec![ComponentInstance::new(
            "grid-1",
            "about",
            "magicui-feature-grid",
            SourceFamily::from("magicui"),
            0,
        )],
    );
    let manifest = engine
        .export_project(
            &[home(vec![instance("hero-1", "shadcn-hero", 0)]), about],
            &DesignSystem::fallback("proj"),
            &CmsSnapshot::default(),
            &CancellationToken::new(),
        )
        .unwrap();

    assert!(manifest.contains("src/pages/HomePage.tsx"));
    assert!(manifest.contains("src/pages/AboutPage.tsx"));
    assert_eq!(manifest.paths().filter(|p| *p == "src/lib/utils.ts").count(), 1);

    let router = manifest.file("src/router.tsx").unwrap();
    assert!(router.contains("\"/\": HomePage,"));
    assert!(router.contains("\"/about\": AboutPage,"));
    assert!(manifest.file("src/main.tsx").unwrap().contains("<Router />"));
}

#[tokio::test]
async fn test_directory_deployer_writes_manifest() {
    let registry = registry();
    let table = table();
    let engine = ExportEngine::new(&registry, &table, ExportOptions::default());
    let manifest = engine
        .export_page(
            &home(vec![instance("hero-1", "shadcn-hero", 0)]),
            &DesignSystem::fallback("proj"),
            &CmsSnapshot::default(),
            &CancellationToken::new(),
        )
        .unwrap();

    let out = tempfile::tempdir().unwrap();
    let deployer = DirectoryDeployer::new(out.path());
    let deployment = deployer
        .deploy(
            &manifest,
            &DeployConfig {
                project_name: "Acme Site".to_string(),
            },
        )
        .await
        .unwrap();

    let root = out.path().join("acme-site");
    assert!(deployment.url.ends_with("acme-site"));
    assert!(root.join("src/components/shadcn/hero.tsx").exists());
    assert!(root.join("index.html").exists());
}

#[tokio::test]
async fn test_async_index_matches_blocking_index() {
    let table = index_sources_async(file_system(), options(), registry()).await.unwrap();
    assert_eq!(table, self::table());
}
