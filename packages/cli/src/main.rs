mod commands;
mod config;
mod project;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use commands::{
    deploy, export, import_content, import_tokens, index, init, DeployArgs, ExportArgs, ImportArgs,
    IndexArgs, InitArgs,
};

/// Pagewright CLI - build pages from components, export them as a project
#[derive(Parser, Debug)]
#[command(name = "pagewright")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Pagewright project
    Init(InitArgs),

    /// Locate the source of every registry component
    Index(IndexArgs),

    /// Export pages as a standalone project
    Export(ExportArgs),

    /// Import a design token document
    ImportTokens(ImportArgs),

    /// Import a marketing content document
    ImportContent(ImportArgs),

    /// Export and publish to a deployment directory
    Deploy(DeployArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Index(args) => index(args, &cwd),
        Command::Export(args) => export(args, &cwd),
        Command::ImportTokens(args) => import_tokens(args, &cwd),
        Command::ImportContent(args) => import_content(args, &cwd),
        Command::Deploy(args) => deploy(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["pagewright", "-v", "import-content", "copy.json", "--apply"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::ImportContent(args) = cli.command else {
            panic!("expected import-content");
        };
        assert!(args.apply);

        let cli = Cli::try_parse_from(["pagewright", "export", "--page", "about"]).unwrap();
        assert!(matches!(cli.command, Command::Export(ExportArgs { page: Some(_), .. })));
    }

    #[test]
    fn test_init_index_import_export_flow() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        init(
            InitArgs {
                project_id: "acme".to_string(),
                name: "Acme".to_string(),
                force: false,
            },
            root,
        )
        .unwrap();

        write(
            root,
            "registry.json",
            r#"[{"id": "shadcn-hero", "displayName": "Hero", "source": "shadcn",
                 "dependencies": ["framer-motion@^11.0.0"]}]"#,
        );
        write(
            root,
            "src/components/shadcn/hero.tsx",
            "import { cn } from \"@/lib/utils\";\nexport function Hero() { return null; }\n",
        );
        write(root, "src/lib/utils.ts", "export const cn = (...c: string[]) => c.join(\" \");\n");

        index(IndexArgs { list: true }, root).unwrap();
        assert!(root.join(".pagewright/source-table.json").exists());

        let project = project::Project::open(root).unwrap();
        let registry = project.registry().unwrap();
        let mut document = project.document(registry).unwrap();
        let page_id = document.pages()[0].id.clone();
        let instance = pagewright_model::ComponentInstance::new(
            "hero-1",
            page_id,
            "shadcn-hero",
            pagewright_model::SourceFamily::from("shadcn"),
            0,
        );
        assert!(document.add_instance(instance, false).unwrap().is_applied());
        drop(document);

        write(root, "copy.json", r#"{"hero": {"headline": "Launch Faster"}}"#);
        import_content(
            ImportArgs {
                file: "copy.json".into(),
                apply: true,
            },
            root,
        )
        .unwrap();

        export(
            ExportArgs {
                page: None,
                out_dir: None,
            },
            root,
        )
        .unwrap();

        let data = std::fs::read_to_string(root.join("dist/src/page-data/home.json")).unwrap();
        assert!(data.contains("Launch Faster"));
        assert!(root.join("dist/src/components/shadcn/hero.tsx").exists());
        assert!(root.join("dist/src/lib/utils.ts").exists());
        let package = std::fs::read_to_string(root.join("dist/package.json")).unwrap();
        assert!(package.contains("framer-motion"));
    }
}
