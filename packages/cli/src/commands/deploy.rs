use crate::commands::export::build_manifest;
use crate::project::Project;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagewright_export::{DeployConfig, Deployer, DirectoryDeployer};
use std::path::Path;

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Deploy a single page (slug or id); all pages when omitted
    #[arg(short, long)]
    pub page: Option<String>,

    /// Directory deployments are written under
    #[arg(short, long, default_value = ".pagewright/deploy")]
    pub target: String,
}

pub fn deploy(args: DeployArgs, cwd: &Path) -> Result<()> {
    let project = Project::open(cwd)?;

    println!("{}", "🚀 Deploying project...".bright_blue().bold());

    let manifest = build_manifest(&project, args.page.as_deref())?;
    let deployer = DirectoryDeployer::new(cwd.join(&args.target));
    let config = DeployConfig {
        project_name: project.config.project_name.clone(),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let deployment = runtime.block_on(deployer.deploy(&manifest, &config))?;

    println!();
    println!("{} Deployed {} files", "✅".green(), manifest.len());
    println!("   URL: {}", deployment.url.bright_white());
    Ok(())
}
