//! Directories managed by folder policies.
use anyhow::Result;

use super::tree::{DeleteFlags, delete_tree};
use super::{Applicable, ResourceChange};
use crate::operations::FileSystemOps;
use crate::policy::action::PolicyAction;
use crate::policy::folder::FolderPolicy;

/// One folder policy bound to a filesystem.
#[derive(Debug)]
pub struct FolderResource<'a> {
    policy: FolderPolicy,
    fs: &'a dyn FileSystemOps,
}

impl<'a> FolderResource<'a> {
    /// Bind `policy` to `fs`.
    #[must_use]
    pub const fn new(policy: FolderPolicy, fs: &'a dyn FileSystemOps) -> Self {
        Self { policy, fs }
    }

    /// The resolved policy.
    #[must_use]
    pub const fn policy(&self) -> &FolderPolicy {
        &self.policy
    }

    const fn flags(&self) -> DeleteFlags {
        DeleteFlags {
            files: self.policy.delete_files,
            folder: self.policy.delete_folder,
            sub_folders: self.policy.delete_sub_folders,
        }
    }

    fn create(&self) -> Result<ResourceChange> {
        if self.fs.is_dir(&self.policy.target_path) {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        self.fs.create_dir_all(&self.policy.target_path)?;
        Ok(ResourceChange::Applied)
    }

    fn delete(&self) -> Result<ResourceChange> {
        let path = &self.policy.target_path;
        if !self.fs.exists(path) {
            return Ok(ResourceChange::Skipped {
                reason: format!("{} does not exist", path.display()),
            });
        }
        delete_tree(self.fs, path, self.flags())?;
        Ok(ResourceChange::Applied)
    }

    /// Carry out the policy's action.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created, listed or removed.
    pub fn act(&self) -> Result<ResourceChange> {
        match self.policy.action {
            PolicyAction::Create | PolicyAction::Update => self.create(),
            PolicyAction::Delete => self.delete(),
            PolicyAction::Replace => {
                self.delete()?;
                self.create()?;
                Ok(ResourceChange::Applied)
            }
        }
    }
}

impl Applicable for FolderResource<'_> {
    fn description(&self) -> String {
        format!(
            "{} {}",
            self.policy.action,
            self.policy.target_path.display()
        )
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.act()
    }
}
