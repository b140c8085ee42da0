use crate::error::DeployError;
use crate::manifest::ExportManifest;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    pub project_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub url: String,
}

/// Publishes an exported manifest somewhere reachable
pub trait Deployer {
    fn deploy(
        &self,
        manifest: &ExportManifest,
        config: &DeployConfig,
    ) -> impl Future<Output = Result<Deployment, DeployError>> + Send;
}

/// Writes the manifest under `<root>/<project-name>/`
#[derive(Debug, Clone)]
pub struct DirectoryDeployer {
    root: PathBuf,
}

impl DirectoryDeployer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn target_dir(&self, config: &DeployConfig) -> PathBuf {
        self.root.join(crate::codegen::package_name(&config.project_name))
    }
}

/// Reject absolute paths and `..` so nothing lands outside the target
fn checked_relative(path: &str) -> Result<&Path, DeployError> {
    let candidate = Path::new(path);
    let safe = candidate
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !safe || path.is_empty() {
        return Err(DeployError::Rejected(format!("unsafe manifest path {}", path)));
    }
    Ok(candidate)
}

impl Deployer for DirectoryDeployer {
    async fn deploy(
        &self,
        manifest: &ExportManifest,
        config: &DeployConfig,
    ) -> Result<Deployment, DeployError> {
        if manifest.is_empty() {
            return Err(DeployError::Rejected("manifest has no files".to_string()));
        }
        for file in &manifest.files {
            checked_relative(&file.path)?;
        }

        let dir = self.target_dir(config);
        for file in &manifest.files {
            let path = dir.join(checked_relative(&file.path)?);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &file.content).await?;
            tracing::debug!("Wrote {}", path.display());
        }

        tracing::info!("Deployed {} file(s) to {}", manifest.len(), dir.display());
        Ok(Deployment {
            url: format!("file://{}", dir.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_escaping_paths() {
        assert!(checked_relative("src/main.tsx").is_ok());
        assert!(checked_relative("../etc/passwd").is_err());
        assert!(checked_relative("/etc/passwd").is_err());
        assert!(checked_relative("").is_err());
    }
}
