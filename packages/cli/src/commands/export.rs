use crate::project::Project;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagewright_export::{CancellationToken, ExportEngine, ExportError, ExportManifest};
use pagewright_model::DesignSystem;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Export a single page (slug or id); all pages when omitted
    #[arg(short, long)]
    pub page: Option<String>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,
}

pub fn export(args: ExportArgs, cwd: &Path) -> Result<()> {
    let project = Project::open(cwd)?;

    println!("{}", "📦 Exporting project...".bright_blue().bold());

    let manifest = build_manifest(&project, args.page.as_deref())?;

    let out_dir = match &args.out_dir {
        Some(dir) => cwd.join(dir),
        None => project.config.out_dir(cwd),
    };
    write_manifest(&manifest, &out_dir)?;

    println!();
    println!(
        "{} Exported {} files, {} packages",
        "✅".green(),
        manifest.len(),
        manifest.dependencies.len()
    );
    println!("   Output: {}", out_dir.display());
    Ok(())
}

/// Snapshot the document and assemble its manifest, printing every
/// problem before failing
pub fn build_manifest(project: &Project, page: Option<&str>) -> Result<ExportManifest> {
    let registry = project.registry()?;
    let table = project.source_table()?;
    let document = project.document(registry.clone())?;

    let pages = match page {
        Some(key) => {
            let found = document
                .page_by_slug(key)
                .or_else(|| document.page(key))
                .ok_or_else(|| anyhow!("Page not found: {}", key))?;
            vec![document.snapshot(&found.id)?]
        }
        None => document.snapshot_all()?,
    };

    let design = match document.design_system()? {
        Some(design) => design,
        None => {
            println!("  {} No design system imported, using defaults", "⚠️".yellow());
            DesignSystem::fallback(document.project_id())
        }
    };
    let cms = document.cms_snapshot()?;

    let engine = ExportEngine::new(&registry, &table, project.export_options());
    match engine.export_project(&pages, &design, &cms, &CancellationToken::new()) {
        Ok(manifest) => Ok(manifest),
        Err(ExportError::MissingSource { missing, problems }) => {
            for m in &missing {
                eprintln!("  {} {} has no source ({})", "✗".red(), m.instance_id, m.registry_id);
            }
            for problem in &problems {
                eprintln!("  {} {}", "✗".red(), problem);
            }
            Err(anyhow!(
                "{} instance(s) have no source. Run: pagewright index",
                missing.len()
            ))
        }
        Err(ExportError::Problems(problems)) => {
            for problem in &problems {
                eprintln!("  {} {}", "✗".red(), problem);
            }
            Err(anyhow!("Export failed with {} problem(s)", problems.len()))
        }
        Err(e) => Err(e.into()),
    }
}

fn write_manifest(manifest: &ExportManifest, out_dir: &Path) -> Result<()> {
    for file in &manifest.files {
        let path = out_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &file.content)?;
        println!("  {} {}", "✓".green(), file.path);
    }
    Ok(())
}
