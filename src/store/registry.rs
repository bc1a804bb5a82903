//! TOML-backed policy registry.
//!
//! ```toml
//! [info]
//! domain = "EXAMPLE"
//! machine_sid = "S-1-5-21-1-2-3"
//!
//! [hklm]
//! 'Software\Policies\Microsoft\Windows\RemovableStorageDevices\Deny_All' = 1
//!
//! [hkcu."S-1-5-21-1-2-3-1104"]
//! 'Software\Policies\Microsoft\Windows\RemovableStorageDevices\Deny_All' = 0
//!
//! [[shortcuts]]
//! sid = "S-1-5-21-1-2-3-1104"
//! shortcut = '{"dest": "%DesktopDir%\\Mail", ...}'
//!
//! [[folders]]
//! sid = "S-1-5-21-1-2-3-1104"
//! path = '%HOME%\Projects'
//! action = "C"
//! ```
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use super::{PolicyEntry, PolicyStore, key_matches, value_to_string};
use crate::error::StoreError;
use crate::policy::folder::FolderObject;

#[derive(Debug, Clone, Deserialize)]
struct ShortcutRecord {
    sid: String,
    shortcut: String,
}

#[derive(Debug, Clone, Deserialize)]
struct FolderRecord {
    sid: String,
    #[serde(flatten)]
    object: FolderObject,
}

/// Policy registry loaded from a TOML cache file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryStore {
    #[serde(default)]
    info: BTreeMap<String, toml::Value>,
    #[serde(default)]
    hklm: BTreeMap<String, toml::Value>,
    #[serde(default)]
    hkcu: BTreeMap<String, BTreeMap<String, toml::Value>>,
    #[serde(default)]
    shortcuts: Vec<ShortcutRecord>,
    #[serde(default)]
    folders: Vec<FolderRecord>,
}

fn filter(table: Option<&BTreeMap<String, toml::Value>>, key: &str) -> Vec<PolicyEntry> {
    table
        .into_iter()
        .flatten()
        .filter(|(k, _)| key_matches(k, key))
        .map(|(k, v)| PolicyEntry::new(k.clone(), value_to_string(v)))
        .collect()
}

impl RegistryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store: nothing has been fetched yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read and
    /// [`StoreError::Parse`] if it is not a valid registry document.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse a registry document; `source` names it in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] if the text is not a valid registry document.
    pub fn parse(content: &str, source: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            StoreError::Parse {
                path: source.to_string(),
                message: e.message().to_string(),
            }
            .into()
        })
    }

    /// Set a scalar metadata value.
    #[must_use]
    pub fn with_info(mut self, name: &str, value: &str) -> Self {
        self.info
            .insert(name.to_string(), toml::Value::String(value.to_string()));
        self
    }

    /// Set a machine value.
    #[must_use]
    pub fn with_hklm(mut self, key: &str, data: &str) -> Self {
        self.hklm
            .insert(key.to_string(), toml::Value::String(data.to_string()));
        self
    }

    /// Set a per-user value.
    #[must_use]
    pub fn with_hkcu(mut self, sid: &str, key: &str, data: &str) -> Self {
        self.hkcu
            .entry(sid.to_string())
            .or_default()
            .insert(key.to_string(), toml::Value::String(data.to_string()));
        self
    }

    /// Add a serialized shortcut for `sid`.
    #[must_use]
    pub fn with_shortcut(mut self, sid: &str, json: &str) -> Self {
        self.shortcuts.push(ShortcutRecord {
            sid: sid.to_string(),
            shortcut: json.to_string(),
        });
        self
    }

    /// Add a folder policy for `sid`.
    #[must_use]
    pub fn with_folder(mut self, sid: &str, object: FolderObject) -> Self {
        self.folders.push(FolderRecord {
            sid: sid.to_string(),
            object,
        });
        self
    }
}

impl PolicyStore for RegistryStore {
    fn filter_hklm_entries(&self, key: &str) -> Vec<PolicyEntry> {
        filter(Some(&self.hklm), key)
    }

    fn filter_hkcu_entries(&self, sid: &str, key: &str) -> Vec<PolicyEntry> {
        filter(self.hkcu.get(sid), key)
    }

    fn get_info(&self, name: &str) -> Option<String> {
        self.info.get(name).map(value_to_string)
    }

    fn get_shortcuts(&self, sid: &str) -> Vec<String> {
        self.shortcuts
            .iter()
            .filter(|r| r.sid == sid)
            .map(|r| r.shortcut.clone())
            .collect()
    }

    fn get_folders(&self, sid: &str) -> Vec<FolderObject> {
        self.folders
            .iter()
            .filter(|r| r.sid == sid)
            .map(|r| r.object.clone())
            .collect()
    }
}
