//! Policy appliers: each turns one family of registry values into system state.
//!
//! Machine appliers implement [`MachineApplier`] and run as root.  User
//! appliers implement [`UserApplier`] and run either from the user's own
//! session or, for root, on the user's behalf.
pub mod browser;
pub mod control;
pub mod folders;
pub mod polkit;
pub mod shortcuts;
pub mod systemd;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::config::Settings;
use crate::exec::Executor;
use crate::logging::{ApplierStatus, Log};
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::resources::{Applicable, ResourceChange};
use crate::store::PolicyStore;

/// Registry branch holding per-module switches.
pub const GPUPDATE_BRANCH: &str = "Software\\BaseALT\\Policies\\GPUpdate";

/// Outcome of a successful applier run.
///
/// # Examples
///
/// ```
/// use gpoa::appliers::ApplierResult;
///
/// let skipped = ApplierResult::Skipped("no policies".into());
/// assert!(matches!(skipped, ApplierResult::Skipped(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplierResult {
    /// Applier ran.
    Ok,
    /// Applier is switched off by policy.
    Disabled,
    /// Applier had nothing to do.
    Skipped(String),
}

/// Shared state every applier reads from.
pub struct Context {
    /// Policy store (read-only).
    pub store: Arc<dyn PolicyStore>,
    /// Output locations.
    pub settings: Settings,
    /// Logger for output and applier recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Filesystem operation abstraction (injectable for testing).
    pub fs_ops: Arc<dyn FileSystemOps>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("store", &self.store)
            .field("settings", &self.settings)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("fs_ops", &self.fs_ops)
            .finish()
    }
}

impl Context {
    /// Creates a context that works on the real filesystem.
    #[must_use]
    pub fn new(
        store: Arc<dyn PolicyStore>,
        settings: Settings,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            store,
            settings,
            log,
            executor,
            fs_ops: Arc::new(SystemFileSystemOps),
        }
    }
}

/// The user a user applier acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    /// Account name.
    pub username: String,
    /// Domain (or local) SID.
    pub sid: String,
    /// Home directory.
    pub home: PathBuf,
}

/// An applier for machine-wide policy.
pub trait MachineApplier: Send + Sync {
    /// Module name, as used by the `GPUpdate` switches.
    fn name(&self) -> &'static str;

    /// Apply the policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy cannot be applied.
    fn apply(&self, ctx: &Context) -> Result<ApplierResult>;
}

/// An applier for per-user policy.
pub trait UserApplier: Send + Sync {
    /// Module name, as used by the `GPUpdate` switches.
    fn name(&self) -> &'static str;

    /// Apply from the user's own session.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy cannot be applied.
    fn user_context_apply(&self, ctx: &Context) -> Result<ApplierResult>;

    /// Apply on the user's behalf with root privileges.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy cannot be applied.
    fn admin_context_apply(&self, ctx: &Context) -> Result<ApplierResult>;
}

/// Whether module `name` should run.
///
/// `GPUpdate\<name>` set to `1` or `0` forces it on or off.  Otherwise
/// regular modules run and experimental ones only when
/// `GPUpdate\GlobalExperimental` is `1`.
#[must_use]
pub fn check_enabled(store: &dyn PolicyStore, name: &str, experimental: bool) -> bool {
    let switch = |key: &str| {
        store
            .get_hklm_entry(&format!("{GPUPDATE_BRANCH}\\{key}"))
            .map(|e| e.data.trim().to_string())
    };
    match switch(name).as_deref() {
        Some("1") => true,
        Some("0") => false,
        _ if experimental => switch("GlobalExperimental").as_deref() == Some("1"),
        _ => true,
    }
}

/// Counters for appliers that process many resources.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplyStats {
    /// Resources changed.
    pub changed: u32,
    /// Resources already in the desired state.
    pub already_ok: u32,
    /// Resources skipped (nothing to do, or failed without bailing).
    pub skipped: u32,
}

impl ApplyStats {
    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    ///
    /// # Examples
    ///
    /// ```
    /// use gpoa::appliers::ApplyStats;
    ///
    /// let stats = ApplyStats { changed: 1, already_ok: 2, skipped: 0 };
    /// assert_eq!(stats.summary(), "1 changed, 2 already ok");
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        if self.skipped > 0 {
            format!(
                "{} changed, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} changed, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and report success.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> ApplierResult {
        ctx.log.info(&self.summary());
        ApplierResult::Ok
    }
}

impl std::ops::AddAssign for ApplyStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Apply each resource in turn.
///
/// With `bail_on_error` the first failure aborts the loop; otherwise it is
/// logged as a warning and counted as skipped.
///
/// # Errors
///
/// Returns the first apply error when `bail_on_error` is set.
pub fn process_resources<R: Applicable>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
    bail_on_error: bool,
) -> Result<ApplyStats> {
    let mut stats = ApplyStats::default();
    for resource in resources {
        let desc = resource.description();
        match resource.apply() {
            Ok(ResourceChange::Applied) => {
                ctx.log.debug(&format!("{verb}: {desc}"));
                stats.changed += 1;
            }
            Ok(ResourceChange::AlreadyCorrect) => {
                ctx.log.debug(&format!("ok: {desc}"));
                stats.already_ok += 1;
            }
            Ok(ResourceChange::Skipped { reason }) => {
                ctx.log.debug(&format!("skipping {desc}: {reason}"));
                stats.skipped += 1;
            }
            Err(e) if bail_on_error => {
                return Err(e).with_context(|| format!("failed to {verb} {desc}"));
            }
            Err(e) => {
                ctx.log.warn(&format!("failed to {verb} {desc}: {e:#}"));
                stats.skipped += 1;
            }
        }
    }
    Ok(stats)
}

/// Run one applier step, recording the result in the logger.
///
/// Errors are logged and recorded, never propagated, so the remaining
/// appliers still run.
pub fn execute(ctx: &Context, name: &str, step: impl FnOnce() -> Result<ApplierResult>) {
    ctx.log.stage(name);
    match step() {
        Ok(ApplierResult::Ok) => ctx.log.record_applier(name, ApplierStatus::Ok, None),
        Ok(ApplierResult::Disabled) => {
            ctx.log.debug(&format!("{name} is disabled"));
            ctx.log
                .record_applier(name, ApplierStatus::Disabled, None);
        }
        Ok(ApplierResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_applier(name, ApplierStatus::Skipped, Some(&reason));
        }
        Err(e) => {
            ctx.log.error(&format!("{name}: {e:#}"));
            ctx.log
                .record_applier(name, ApplierStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}
