//! Runtime settings: where the policy store lives and where artifacts go.
pub mod toml_loader;

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the settings file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/gpoa/gpoa.toml";

/// Settings loaded from `gpoa.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Policy store file.
    pub store: PathBuf,
    /// Directory that receives generated PolicyKit rules.
    pub polkit_rules_dir: PathBuf,
    /// Directory searched for rule templates (`<id>.rules.j2`).
    pub template_dir: PathBuf,
    /// Directories that receive the Firefox `policies.json`.
    pub firefox_policy_dirs: Vec<PathBuf>,
    /// Directory that receives the Chromium `policies.json`.
    pub chromium_policy_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: PathBuf::from("/var/cache/gpoa/registry.toml"),
            polkit_rules_dir: PathBuf::from("/etc/polkit-1/rules.d"),
            template_dir: PathBuf::from("/usr/share/gpupdate/templates"),
            firefox_policy_dirs: vec![
                PathBuf::from("/usr/lib64/firefox/distribution"),
                PathBuf::from("/etc/firefox/policies"),
            ],
            chromium_policy_dir: PathBuf::from("/etc/chromium/policies/managed"),
        }
    }
}

impl Settings {
    /// Load settings from `path`; a missing file gives the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        toml_loader::load_config(path)
    }

    /// Settings with every output directory rooted under `root`.
    ///
    /// Used to run appliers against a scratch tree.
    #[must_use]
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            store: root.join("registry.toml"),
            polkit_rules_dir: root.join("polkit-1/rules.d"),
            template_dir: root.join("templates"),
            firefox_policy_dirs: vec![root.join("firefox/distribution")],
            chromium_policy_dir: root.join("chromium/policies/managed"),
        }
    }
}
