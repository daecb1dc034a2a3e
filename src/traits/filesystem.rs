use anyhow::{Context, Result};
use std::path::Path;
#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::path::PathBuf;
#[cfg(test)]
use std::sync::RwLock;

/// Filesystem access used by the bootstrap run, mockable in tests
pub trait FileSystem: Send + Sync {
    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write (or overwrite) a file with the given contents
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Create directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Check if path exists
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation using std::fs
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        std::fs::write(path, contents).with_context(|| format!("Failed to write file: {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {:?}", path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory filesystem for tests
#[cfg(test)]
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, String>>,
    directories: RwLock<Vec<PathBuf>>,
    /// Every write in order, including overwrites
    writes: RwLock<Vec<(PathBuf, String)>>,
}

#[cfg(test)]
impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            directories: RwLock::new(Vec::new()),
            writes: RwLock::new(Vec::new()),
        }
    }

    /// Seed a file without recording it as a write
    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), contents.to_string());
        self
    }

    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.directories.write().unwrap().push(path.into());
        self
    }

    pub fn get_file_contents(&self, path: &Path) -> Option<String> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// All writes made to `path`, oldest first
    pub fn writes_to(&self, path: &Path) -> Vec<String> {
        self.writes
            .read()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.writes.read().unwrap().len()
    }
}

#[cfg(test)]
impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .with_context(|| format!("File not found in mock filesystem: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_string());
        self.writes
            .write()
            .unwrap()
            .push((path.to_path_buf(), contents.to_string()));
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.directories.write().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
            || self.directories.read().unwrap().iter().any(|d| d == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_real_filesystem_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.tf");

        assert!(!RealFileSystem.exists(&path));
        RealFileSystem.write(&path, "resource {}").unwrap();

        assert!(RealFileSystem.exists(&path));
        assert_eq!(RealFileSystem.read_to_string(&path).unwrap(), "resource {}");
    }

    #[test]
    fn test_mock_filesystem_tracks_overwrites() {
        let fs = MockFileSystem::new();
        let path = PathBuf::from("/out/a.tf");

        fs.write(&path, "first").unwrap();
        fs.write(&path, "second").unwrap();

        assert_eq!(fs.writes_to(&path), vec!["first", "second"]);
        assert_eq!(fs.get_file_contents(&path).as_deref(), Some("second"));
    }

    #[test]
    fn test_mock_filesystem_seeded_file_is_not_a_write() {
        let fs = MockFileSystem::new().with_file("/tables.txt", "a.b");

        assert!(fs.exists(Path::new("/tables.txt")));
        assert_eq!(fs.write_count(), 0);
    }
}
