use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File system abstraction used by build-time source indexing and testing
pub trait FileSystem {
    /// Check if a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    /// Read a file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> Result<String, std::io::Error>;

    /// List the regular files directly inside `dir`, sorted by path.
    ///
    /// A missing directory yields an empty list.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, std::io::Error>;
}

/// Real file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Mock file system for testing
#[derive(Debug, Default)]
pub struct MockFileSystem {
    pub files: BTreeMap<PathBuf, String>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.files.keys().any(|p| p.starts_with(path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String, std::io::Error> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
        Ok(self
            .files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_lists_direct_children_only() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/src/components/ui/button.tsx", "export const Button = 1;");
        fs.add_file("/src/components/ui/nested/card.tsx", "");
        fs.add_file("/src/components/hero/hero.tsx", "");

        let files = fs.list_files(Path::new("/src/components/ui")).unwrap();
        assert_eq!(files, vec![PathBuf::from("/src/components/ui/button.tsx")]);
        assert!(fs.exists(Path::new("/src/components")));
        assert!(!fs.exists(Path::new("/src/lib")));
    }
}
