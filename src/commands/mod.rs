//! Subcommand handlers.
pub mod apply;
pub mod shortcuts;
pub mod version;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::logging::Logger;
use crate::store::RegistryStore;

/// Settings and policy store shared by commands that apply policy.
#[derive(Debug)]
pub struct CommandSetup {
    /// Loaded settings with overrides applied.
    pub settings: Settings,
    /// Policy registry read from the cache.
    pub store: RegistryStore,
}

impl CommandSetup {
    /// Load the settings file, apply command-line overrides and read the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file or the policy store cannot be
    /// read or parsed.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        log.stage("Loading settings");
        let mut settings = Settings::load(&global.config)?;
        if let Some(store) = &global.store {
            settings.store.clone_from(store);
        }
        log.debug(&format!("settings: {}", global.config.display()));

        log.stage("Loading policy store");
        let store = RegistryStore::load(&settings.store)?;
        log.info(&format!("store: {}", settings.store.display()));

        Ok(Self { settings, store })
    }
}

/// Print the summary and bail if any applier failed.
///
/// # Errors
///
/// Returns an error if one or more appliers recorded a failure.
pub fn finish_run(log: &Logger) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} applier(s) failed");
    }
    Ok(())
}
