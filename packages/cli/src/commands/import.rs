use crate::project::{all_instances, Project};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagewright_bindings::{ContentBridge, DesignTokenBridge, PropPatch, TokenDocument};
use pagewright_editor::{DocumentStore, InstancePatch};
use pagewright_store::DurableStore;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Document to import
    pub file: PathBuf,

    /// Commit the changes; without this only a preview is printed
    #[arg(long)]
    pub apply: bool,
}

pub fn import_tokens(args: ImportArgs, cwd: &Path) -> Result<()> {
    let project = Project::open(cwd)?;
    let registry = project.registry()?;
    let mut document = project.document(registry)?;

    let doc = TokenDocument::from_json(&std::fs::read_to_string(cwd.join(&args.file))?)?;
    let instances = all_instances(&document);
    let import = DesignTokenBridge::import(&doc, document.project_id(), &instances)?;

    println!(
        "{} {}",
        "🎨 Design system".bright_blue().bold(),
        import.design_system.name.bright_white()
    );
    for (group, key, value) in import.design_system.tokens() {
        println!("  {}.{} = {}", group.as_str(), key, value);
    }
    print_patches(&import.patches);

    if !args.apply {
        println!();
        println!("{}", "Dry run. Re-run with --apply to commit.".dimmed());
        return Ok(());
    }

    document.replace_design_system(&import.design_system)?;
    let applied = apply_patches(&mut document, import.patches)?;
    println!();
    println!(
        "{} Imported design system, updated {} instance(s)",
        "✅".green(),
        applied
    );
    Ok(())
}

pub fn import_content(args: ImportArgs, cwd: &Path) -> Result<()> {
    let project = Project::open(cwd)?;
    let registry = project.registry()?;
    let mut document = project.document(registry.clone())?;

    let bridge = ContentBridge::from_json(&std::fs::read_to_string(cwd.join(&args.file))?)?;
    let instances = all_instances(&document);
    let import = bridge.apply(&registry, &instances);

    println!("{}", "📝 Content import".bright_blue().bold());
    print_patches(&import.patches);
    for collision in &import.collisions {
        println!(
            "  {} {{{}}} is defined by {} and {}; using {}",
            "⚠️".yellow(),
            collision.field,
            collision.used,
            collision.shadowed.join(", "),
            collision.used
        );
    }

    if !args.apply {
        println!();
        println!("{}", "Dry run. Re-run with --apply to commit.".dimmed());
        return Ok(());
    }

    let applied = apply_patches(&mut document, import.patches)?;
    println!();
    println!("{} Updated {} instance(s)", "✅".green(), applied);
    Ok(())
}

fn print_patches(patches: &[PropPatch]) {
    if patches.is_empty() {
        println!("  {}", "No instance props change".dimmed());
    }
    for patch in patches {
        let keys: Vec<&str> = patch.props.keys().map(String::as_str).collect();
        println!("  {} {}: {}", "~".cyan(), patch.instance_id, keys.join(", "));
    }
}

/// Commit each patch through the document store; returns how many changed
fn apply_patches<S: DurableStore>(
    document: &mut DocumentStore<S>,
    patches: Vec<PropPatch>,
) -> Result<usize> {
    let mut applied = 0;
    for patch in patches {
        let outcome = document.update_instance(&patch.instance_id, InstancePatch::props(patch.props))?;
        if outcome.is_applied() {
            applied += 1;
        } else {
            tracing::debug!("{} unchanged", patch.instance_id);
        }
    }
    Ok(applied)
}
