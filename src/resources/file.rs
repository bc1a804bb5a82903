//! Generated files whose whole content is owned by an applier.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A file that must hold exactly `content`.
///
/// Used for `.desktop` entries, PolicyKit rules and browser policy files.
/// Unchanged content is never rewritten.
#[derive(Debug, Clone)]
pub struct ManagedFile {
    /// Destination path.
    pub path: PathBuf,
    /// Desired content.
    pub content: String,
}

impl ManagedFile {
    /// Create a new managed file resource.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Ensure the parent directory of `path` exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

impl Applicable for ManagedFile {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
            ResourceState::Missing | ResourceState::Incorrect { .. } => {
                ensure_parent_dir(&self.path)?;
                std::fs::write(&self.path, &self.content)
                    .with_context(|| format!("write {}", self.path.display()))?;
                Ok(ResourceChange::Applied)
            }
        }
    }
}

impl Resource for ManagedFile {
    fn current_state(&self) -> Result<ResourceState> {
        if self.path.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} is a directory", self.path.display()),
            });
        }
        match std::fs::read_to_string(&self.path) {
            Ok(current) if current == self.content => Ok(ResourceState::Correct),
            Ok(current) => Ok(ResourceState::Incorrect { current }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ResourceState::Missing),
            Err(e) => Err(e).with_context(|| format!("read {}", self.path.display())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn writes_missing_file_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/entry.desktop");
        let file = ManagedFile::new(&path, "[Desktop Entry]\n");
        assert_eq!(file.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(file.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[Desktop Entry]\n");
    }

    #[test]
    fn unchanged_content_is_already_correct() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.rules");
        std::fs::write(&path, "same").unwrap();
        let file = ManagedFile::new(&path, "same");
        assert!(!file.needs_change().unwrap());
        assert_eq!(file.apply().unwrap(), ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn different_content_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.rules");
        std::fs::write(&path, "old").unwrap();
        let file = ManagedFile::new(&path, "new");
        assert_eq!(
            file.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "old".to_string()
            }
        );
        file.apply().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn directory_in_the_way_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let file = ManagedFile::new(dir.path(), "x");
        assert!(matches!(
            file.apply().unwrap(),
            ResourceChange::Skipped { .. }
        ));
    }
}
