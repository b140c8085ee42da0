use crate::project::Project;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagewright_common::RealFileSystem;
use pagewright_export::{MatchKind, SourceIndexBuilder};
use std::path::Path;

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// List every matched component, not just the summary
    #[arg(short, long)]
    pub list: bool,
}

pub fn index(args: IndexArgs, cwd: &Path) -> Result<()> {
    let project = Project::open(cwd)?;
    let registry = project.registry()?;

    println!("{}", "🔎 Indexing component sources...".bright_blue().bold());

    let table = SourceIndexBuilder::new(&RealFileSystem, project.index_options()).build(&registry)?;

    if args.list {
        for (id, source) in &table.components {
            let how = match source.matched_by {
                MatchKind::Explicit => "explicit",
                MatchKind::Exact => "exact",
                MatchKind::PrefixStripped => "prefix stripped",
                MatchKind::Fuzzy => "fuzzy",
            };
            println!("  {} {} → {} {}", "✓".green(), id, source.module, format!("({})", how).dimmed());
        }
    }

    for id in &table.unmatched {
        println!("  {} {} {}", "✗".yellow(), id, "no source found".yellow());
    }
    for id in &table.failed {
        println!("  {} {} {}", "✗".red(), id, "source unreadable".red());
    }

    let path = project.config.source_table_path(cwd);
    table.save(&path)?;

    println!();
    if table.unmatched.is_empty() && table.failed.is_empty() {
        println!(
            "{} Indexed {} components, {} modules",
            "✅".green(),
            table.components.len(),
            table.modules.len()
        );
    } else {
        println!(
            "{} Indexed {} components, {} modules, {} unmatched, {} unreadable",
            "⚠️".yellow(),
            table.components.len(),
            table.modules.len(),
            table.unmatched.len(),
            table.failed.len()
        );
    }
    println!("   Wrote {}", project.config.source_table_path);

    Ok(())
}
