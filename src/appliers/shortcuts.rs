//! Desktop shortcuts for the machine and for users.
use std::path::Path;

use anyhow::{Result, bail};

use super::{
    ApplierResult, ApplyStats, Context, MachineApplier, UserApplier, UserSession, check_enabled,
    process_resources,
};
use crate::policy::shortcut::ShortcutPolicy;

/// Parse every stored shortcut of `sid`, logging the ones that fail.
///
/// Returns the parsed shortcuts and the number of failures.
fn load_shortcuts(ctx: &Context, sid: &str) -> (Vec<ShortcutPolicy>, usize) {
    let mut shortcuts = Vec::new();
    let mut failures = 0;
    for json in ctx.store.get_shortcuts(sid) {
        match ShortcutPolicy::from_json(&json) {
            Ok(sc) => shortcuts.push(sc),
            Err(e) => {
                ctx.log.error(&format!("invalid shortcut for {sid}: {e:#}"));
                failures += 1;
            }
        }
    }
    (shortcuts, failures)
}

fn write_shortcuts<'a>(
    ctx: &Context,
    shortcuts: impl IntoIterator<Item = &'a ShortcutPolicy>,
    home: Option<&Path>,
) -> Result<ApplyStats> {
    let files = shortcuts
        .into_iter()
        .map(|sc| sc.desktop_file(&sc.desktop_path(home)));
    process_resources(ctx, files, "write", false)
}

fn finish(ctx: &Context, stats: ApplyStats, failures: usize) -> Result<ApplierResult> {
    let result = stats.finish(ctx);
    if failures > 0 {
        bail!("{failures} shortcut(s) could not be read");
    }
    Ok(result)
}

/// Machine-wide shortcuts (stored under the machine SID).
#[derive(Debug)]
pub struct ShortcutsApplier {
    enabled: bool,
}

impl ShortcutsApplier {
    /// Module name.
    pub const NAME: &'static str = "ShortcutsApplier";

    /// Create the applier.
    #[must_use]
    pub fn new(ctx: &Context) -> Self {
        Self {
            enabled: check_enabled(ctx.store.as_ref(), Self::NAME, false),
        }
    }
}

impl MachineApplier for ShortcutsApplier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, ctx: &Context) -> Result<ApplierResult> {
        if !self.enabled {
            return Ok(ApplierResult::Disabled);
        }
        let Some(sid) = ctx.store.get_info("machine_sid") else {
            return Ok(ApplierResult::Skipped("machine SID unknown".to_string()));
        };
        let (shortcuts, failures) = load_shortcuts(ctx, &sid);
        if shortcuts.is_empty() && failures == 0 {
            return Ok(ApplierResult::Skipped("no shortcuts".to_string()));
        }
        let stats = write_shortcuts(ctx, &shortcuts, None)?;
        finish(ctx, stats, failures)
    }
}

/// Shortcuts for one user.
///
/// Shortcuts flagged `is_in_user_context` are written from the user's
/// session; the rest are written by root on the user's behalf.
#[derive(Debug)]
pub struct ShortcutsApplierUser {
    session: UserSession,
    enabled: bool,
}

impl ShortcutsApplierUser {
    /// Module name.
    pub const NAME: &'static str = "ShortcutsApplierUser";

    /// Create the applier for `session`.
    #[must_use]
    pub fn new(ctx: &Context, session: &UserSession) -> Self {
        Self {
            session: session.clone(),
            enabled: check_enabled(ctx.store.as_ref(), Self::NAME, false),
        }
    }

    fn run(&self, ctx: &Context, user_context: bool) -> Result<ApplierResult> {
        if !self.enabled {
            return Ok(ApplierResult::Disabled);
        }
        let (shortcuts, failures) = load_shortcuts(ctx, &self.session.sid);
        let selected: Vec<_> = shortcuts
            .iter()
            .filter(|sc| sc.is_in_user_context == user_context)
            .collect();
        if selected.is_empty() && failures == 0 {
            return Ok(ApplierResult::Skipped("no shortcuts".to_string()));
        }
        let stats = write_shortcuts(ctx, selected, Some(&self.session.home))?;
        finish(ctx, stats, failures)
    }
}

impl UserApplier for ShortcutsApplierUser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn user_context_apply(&self, ctx: &Context) -> Result<ApplierResult> {
        self.run(ctx, true)
    }

    fn admin_context_apply(&self, ctx: &Context) -> Result<ApplierResult> {
        self.run(ctx, false)
    }
}
