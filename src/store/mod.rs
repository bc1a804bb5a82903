//! Read-only access to the cached policy registry.
//!
//! Appliers only ever query the store; nothing in this crate writes to it.
pub mod registry;

pub use registry::RegistryStore;

use serde::{Deserialize, Deserializer};

use crate::policy::folder::FolderObject;

/// One registry value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEntry {
    /// Full key path including the value name (e.g.
    /// `Software\Policies\Google\Chrome\HomepageLocation`).
    pub hive_key: String,
    /// Value data as a string.
    pub data: String,
}

impl PolicyEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(hive_key: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            hive_key: hive_key.into(),
            data: data.into(),
        }
    }

    /// The last component of the key path.
    #[must_use]
    pub fn value_name(&self) -> &str {
        self.hive_key
            .rsplit('\\')
            .next()
            .unwrap_or(&self.hive_key)
    }

    /// The key path below `branch`, split into components.
    ///
    /// Returns an empty list when the entry is not below `branch`.
    #[must_use]
    pub fn parts_below(&self, branch: &str) -> Vec<&str> {
        let prefix_len = branch.trim_end_matches('\\').len();
        if !key_matches(&self.hive_key, branch) || self.hive_key.len() <= prefix_len {
            return Vec::new();
        }
        self.hive_key
            .get(prefix_len..)
            .unwrap_or_default()
            .split('\\')
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// Whether `entry_key` is `key` itself or lies below it.
///
/// Registry keys compare case-insensitively.
#[must_use]
pub fn key_matches(entry_key: &str, key: &str) -> bool {
    let entry = entry_key.to_ascii_lowercase();
    let key = key.trim_end_matches('\\').to_ascii_lowercase();
    entry == key
        || entry
            .strip_prefix(&key)
            .is_some_and(|rest| rest.starts_with('\\'))
}

/// Query interface over the policy registry.
pub trait PolicyStore: Send + Sync + std::fmt::Debug {
    /// Machine (HKLM) entries at or below `key`, ordered by key.
    fn filter_hklm_entries(&self, key: &str) -> Vec<PolicyEntry>;

    /// Per-user (HKCU) entries of `sid` at or below `key`, ordered by key.
    fn filter_hkcu_entries(&self, sid: &str, key: &str) -> Vec<PolicyEntry>;

    /// Scalar metadata such as `domain` or `machine_sid`.
    fn get_info(&self, name: &str) -> Option<String>;

    /// Serialized shortcuts (JSON) stored for `sid`.
    fn get_shortcuts(&self, sid: &str) -> Vec<String>;

    /// Raw folder policies stored for `sid`.
    fn get_folders(&self, sid: &str) -> Vec<FolderObject>;

    /// The machine entry stored under exactly `key`.
    fn get_hklm_entry(&self, key: &str) -> Option<PolicyEntry> {
        self.filter_hklm_entries(key)
            .into_iter()
            .find(|e| e.hive_key.eq_ignore_ascii_case(key))
    }
}

/// Convert a TOML value to the string form registry data takes.
#[must_use]
pub fn value_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
        _ => value.to_string(),
    }
}

/// Serde helper: accept any scalar and keep it as registry string data.
///
/// # Errors
///
/// Propagates the deserializer's error.
pub fn registry_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = toml::Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}
