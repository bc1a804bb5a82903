//! Structured logger with per-applier summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{ApplierEntry, ApplierStatus, Log};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger that also collects applier results for the summary.
///
/// Messages go through `tracing`; the file layer installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) keeps a copy at
/// `$XDG_CACHE_HOME/gpoa/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    appliers: Mutex<Vec<ApplierEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            appliers: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded applier entries.
    #[must_use]
    pub fn applier_entries(&self) -> Vec<ApplierEntry> {
        self.appliers.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record an applier result for the summary.
    pub fn record_applier(&self, name: &str, status: ApplierStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.appliers.lock() {
            guard.push(ApplierEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed appliers.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.appliers.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|t| t.status == ApplierStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded appliers.
    pub fn print_summary(&self) {
        let appliers = self.applier_entries();
        if appliers.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut ok = 0u32;
        let mut disabled = 0u32;
        let mut skipped = 0u32;
        let mut failed = 0u32;

        for applier in &appliers {
            let (icon, color) = match applier.status {
                ApplierStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                ApplierStatus::Disabled => {
                    disabled += 1;
                    ("·", "\x1b[2m")
                }
                ApplierStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                ApplierStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = applier
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", applier.name));
        }

        let total = ok + disabled + skipped + failed;
        self.info(&format!(
            "{total} appliers: \x1b[32m{ok} ok\x1b[0m, \x1b[2m{disabled} disabled\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record_applier(&self, name: &str, status: ApplierStatus, message: Option<&str>) {
        self.record_applier(name, status, message);
    }
}
