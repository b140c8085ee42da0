use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "pagewright.config.json";

/// Pagewright configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Project the data store entries belong to
    pub project_id: String,

    /// Name used for the generated package and page title
    pub project_name: String,

    /// Component catalog (JSON array of registry entries)
    pub registry_path: String,

    /// Directory with one sub-directory per component family
    pub components_dir: String,

    /// Directories captured wholesale, sub-directories included
    pub shared_dirs: Vec<String>,

    /// Where `index` writes and `export` reads the source table
    pub source_table_path: String,

    /// JSON file backing the document store
    pub data_path: String,

    /// Export output directory
    pub out_dir: String,

    /// Versions for packages referenced without one
    pub package_versions: BTreeMap<String, String>,

    /// Leave hidden instances out of dependency collection
    pub exclude_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: "default".to_string(),
            project_name: "Pagewright Site".to_string(),
            registry_path: "registry.json".to_string(),
            components_dir: "src/components".to_string(),
            shared_dirs: vec!["src/components/ui".to_string(), "src/lib".to_string()],
            source_table_path: ".pagewright/source-table.json".to_string(),
            data_path: ".pagewright/data.json".to_string(),
            out_dir: "dist".to_string(),
            package_versions: BTreeMap::new(),
            exclude_hidden: false,
        }
    }
}

impl Config {
    /// Load config from a directory; a missing file yields defaults
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!("Loaded {}", config_path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn registry_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.registry_path)
    }

    pub fn source_table_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.source_table_path)
    }

    pub fn data_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.data_path)
    }

    pub fn out_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.out_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{
            "projectId": "acme",
            "componentsDir": "components",
            "packageVersions": { "framer-motion": "^11.0.0" },
            "excludeHidden": true
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.project_id, "acme");
        assert_eq!(config.components_dir, "components");
        assert_eq!(config.package_versions["framer-motion"], "^11.0.0");
        assert!(config.exclude_hidden);
        assert_eq!(config.registry_path, "registry.json");
        assert_eq!(config.shared_dirs, vec!["src/components/ui", "src/lib"]);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.out_dir(dir.path()), dir.path().join("dist"));
    }
}
