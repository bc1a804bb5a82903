//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that folder policies and the tree
//! deleter can be unit-tested without touching the real filesystem.
//! Production code uses [`SystemFileSystemOps`]; tests use `MockFileSystemOps`.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Abstraction over the filesystem queries and mutations used by appliers.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory (symlinks are not followed).
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns the immediate child paths inside `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Remove the file, symlink or empty directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove(&self, path: &Path) -> Result<()>;

    /// Create `path` and all missing parents; succeeds if it already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if any component cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists() || path.symlink_metadata().is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok_and(|m| m.is_dir())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        std::fs::read_dir(path)
            .with_context(|| format!("reading directory {}", path.display()))?
            .map(|e| {
                e.map(|entry| entry.path())
                    .with_context(|| format!("reading entry in {}", path.display()))
            })
            .collect()
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let meta = std::fs::symlink_metadata(path)
            .with_context(|| format!("stat {}", path.display()))?;
        if meta.is_dir() {
            std::fs::remove_dir(path)
        } else {
            std::fs::remove_file(path)
        }
        .with_context(|| format!("remove {}", path.display()))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).with_context(|| format!("create {}", path.display()))
    }
}

/// In-memory [`FileSystemOps`] for unit tests.
///
/// Holds a set of files and directories; `remove` and `create_dir_all`
/// mutate that set so multi-step operations can be asserted on afterwards.
/// Paths registered with [`with_locked`](Self::with_locked) refuse removal.
///
/// # Example
///
/// ```ignore
/// let fs = MockFileSystemOps::new()
///     .with_dir("/home/u/docs")
///     .with_file("/home/u/docs/a.txt");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    entries: std::sync::Mutex<std::collections::BTreeMap<PathBuf, bool>>,
    locked: Vec<PathBuf>,
    removed: std::sync::Mutex<Vec<PathBuf>>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(self, path: impl Into<PathBuf>, is_dir: bool) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(path.into(), is_dir);
        }
        self
    }

    /// Register a directory.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.insert(path, true)
    }

    /// Register a regular file.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        self.insert(path, false)
    }

    /// Make removal of `path` fail with a permission error.
    #[must_use]
    pub fn with_locked(mut self, path: impl Into<PathBuf>) -> Self {
        self.locked.push(path.into());
        self
    }

    /// Paths removed so far, in removal order.
    #[must_use]
    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed
            .lock()
            .map_or_else(|_| Vec::new(), |guard| guard.clone())
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.entries.lock().is_ok_and(|e| e.contains_key(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.entries
            .lock()
            .is_ok_and(|e| e.get(path).copied().unwrap_or(false))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !self.is_dir(path) {
            anyhow::bail!("mock: not a directory: {}", path.display());
        }
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("mock: entries poisoned"))?;
        Ok(entries
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        if self.locked.iter().any(|p| p == path) {
            anyhow::bail!("mock: permission denied: {}", path.display());
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("mock: entries poisoned"))?;
        if entries.keys().any(|p| p.parent() == Some(path)) {
            anyhow::bail!("mock: directory not empty: {}", path.display());
        }
        if entries.remove(path).is_none() {
            anyhow::bail!("mock: no such entry: {}", path.display());
        }
        if let Ok(mut removed) = self.removed.lock() {
            removed.push(path.to_path_buf());
        }
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("mock: entries poisoned"))?;
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            match entries.get(ancestor) {
                Some(false) => anyhow::bail!("mock: not a directory: {}", ancestor.display()),
                Some(true) => {}
                None => {
                    entries.insert(ancestor.to_path_buf(), true);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn system_create_and_remove_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        SystemFileSystemOps.create_dir_all(&nested).unwrap();
        assert!(SystemFileSystemOps.is_dir(&nested));
        SystemFileSystemOps.remove(&nested).unwrap();
        assert!(!SystemFileSystemOps.exists(&nested));
    }

    #[test]
    fn system_read_dir_lists_children() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f"), "x").unwrap();
        std::fs::create_dir(dir.path().join("d")).unwrap();
        let mut children = SystemFileSystemOps.read_dir(dir.path()).unwrap();
        children.sort();
        assert_eq!(children, vec![dir.path().join("d"), dir.path().join("f")]);
    }

    #[test]
    fn system_remove_refuses_non_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("f"), "x").unwrap();
        assert!(SystemFileSystemOps.remove(&sub).is_err());
    }

    #[test]
    fn mock_read_dir_returns_direct_children_only() {
        let fs = MockFileSystemOps::new()
            .with_dir("/r")
            .with_dir("/r/sub")
            .with_file("/r/sub/deep")
            .with_file("/r/top");
        let children = fs.read_dir(Path::new("/r")).unwrap();
        assert_eq!(children, vec![PathBuf::from("/r/sub"), PathBuf::from("/r/top")]);
    }

    #[test]
    fn mock_remove_rejects_non_empty_and_locked() {
        let fs = MockFileSystemOps::new()
            .with_dir("/r")
            .with_file("/r/f")
            .with_locked("/r/f");
        assert!(fs.remove(Path::new("/r")).is_err());
        assert!(fs.remove(Path::new("/r/f")).is_err());
        assert!(fs.removed().is_empty());
    }

    #[test]
    fn mock_create_dir_all_adds_ancestors() {
        let fs = MockFileSystemOps::new();
        fs.create_dir_all(Path::new("/a/b/c")).unwrap();
        assert!(fs.is_dir(Path::new("/a")));
        assert!(fs.is_dir(Path::new("/a/b/c")));
    }
}
