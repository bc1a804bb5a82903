//! Folder policy objects.
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use super::action::{self, PolicyAction};
use super::windows::{expand_windows_var, str2bool};
use crate::store::registry_string;

/// A folder policy exactly as it sits in the policy store.
///
/// All fields are kept as registry strings; interpretation happens in
/// [`FolderPolicy::new`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FolderObject {
    /// Windows-style path, possibly containing `%VAR%` tokens.
    pub path: String,
    /// Action letter (`C`, `U`, `D`, `R`).
    pub action: String,
    /// Remove the folder itself once it is empty.
    #[serde(default, deserialize_with = "registry_string")]
    pub delete_folder: String,
    /// Descend into sub-folders when deleting.
    #[serde(default, deserialize_with = "registry_string")]
    pub delete_sub_folders: String,
    /// Remove files when deleting.
    #[serde(default, deserialize_with = "registry_string")]
    pub delete_files: String,
}

/// A resolved folder policy, ready to be acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderPolicy {
    /// Absolute target path after variable expansion.
    pub target_path: PathBuf,
    /// Requested action.
    pub action: PolicyAction,
    /// Remove files when deleting.
    pub delete_files: bool,
    /// Remove the folder itself once it is empty.
    pub delete_folder: bool,
    /// Descend into sub-folders when deleting.
    pub delete_sub_folders: bool,
}

impl FolderPolicy {
    /// Build a folder policy for the user whose home is `home` (or for the
    /// machine when `None`).
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnknownAction`](crate::error::PolicyError::UnknownAction)
    /// if the action letter is not recognised.
    pub fn new(object: &FolderObject, home: Option<&Path>) -> Result<Self> {
        let expanded = expand_windows_var(&object.path, home).replace('\\', "/");
        Ok(Self {
            target_path: PathBuf::from(expanded),
            action: action::resolve(&object.action)?,
            delete_files: str2bool(&object.delete_files),
            delete_folder: str2bool(&object.delete_folder),
            delete_sub_folders: str2bool(&object.delete_sub_folders),
        })
    }
}
