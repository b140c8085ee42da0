use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagewright_editor::DocumentStore;
use pagewright_model::{Page, Project};
use pagewright_registry::Registry;
use pagewright_store::{to_record, Collection, DurableStore, JsonFileStore};
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project id used in the data store
    #[arg(long, default_value = "default")]
    pub project_id: String,

    /// Project name
    #[arg(short, long, default_value = "Pagewright Site")]
    pub name: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        "📝 Initializing Pagewright project...".bright_blue().bold()
    );

    let config = Config {
        project_id: args.project_id.clone(),
        project_name: args.name.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let registry_path = config.registry_path(cwd);
    if !registry_path.exists() {
        fs::write(&registry_path, "[]\n")?;
        println!("  {} Created {}", "✓".green(), config.registry_path);
    }

    let components_dir = cwd.join(&config.components_dir);
    if !components_dir.exists() {
        fs::create_dir_all(&components_dir)?;
        println!("  {} Created {}/", "✓".green(), config.components_dir);
    }

    let durable = JsonFileStore::open(config.data_path(cwd))?;
    let mut document = DocumentStore::load(
        config.project_id.clone(),
        Arc::new(Registry::default()),
        durable,
    )?;

    let store: &mut dyn DurableStore = document.durable_mut();
    store.put(
        Collection::Projects,
        to_record(&Project::new(config.project_id.clone(), config.project_name.clone()))?,
    )?;

    if document.pages().is_empty() {
        let home = Page::new(
            format!("{}-home", config.project_id),
            config.project_id.clone(),
            "Home",
            "home",
            0,
        );
        document.add_page(home)?;
        println!("  {} Created page {}", "✓".green(), "Home".bright_white());
    }
    println!("  {} Created {}", "✓".green(), config.data_path);

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Describe your components in {}", config.registry_path);
    println!("  2. Run: pagewright index");
    println!("  3. Run: pagewright export");

    Ok(())
}
