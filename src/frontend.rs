//! The orchestrator: decides who policy is applied for and runs the appliers.
use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::appliers::browser::{ChromiumApplier, FirefoxApplier};
use crate::appliers::control::ControlApplier;
use crate::appliers::folders::FoldersApplierUser;
use crate::appliers::polkit::{PolkitApplier, PolkitApplierUser};
use crate::appliers::shortcuts::{ShortcutsApplier, ShortcutsApplierUser};
use crate::appliers::systemd::SystemdApplier;
use crate::appliers::{Context, MachineApplier, UserApplier, UserSession, execute};
use crate::error::FrontendError;
use crate::identity::{Identity, resolve_sid};
use crate::logging::Log;

/// Which half of the policy to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Target {
    /// Machine and user policy.
    #[default]
    #[value(name = "All")]
    All,
    /// Machine policy only.
    #[value(name = "Computer")]
    Computer,
    /// User policy only.
    #[value(name = "User")]
    User,
}

impl Target {
    const fn includes_machine(self) -> bool {
        matches!(self, Self::All | Self::Computer)
    }

    const fn includes_user(self) -> bool {
        matches!(self, Self::All | Self::User)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "All",
            Self::Computer => "Computer",
            Self::User => "User",
        })
    }
}

/// Pick the user to act for.
///
/// Without an explicit name the process owner is used.  Acting for anyone
/// other than the process owner requires root.
///
/// # Errors
///
/// Returns [`FrontendError::PermissionDenied`] when a non-root process asks
/// for another user, or an identity lookup error.
pub fn determine_username(
    identity: &dyn Identity,
    log: &dyn Log,
    username: Option<&str>,
) -> Result<String> {
    let name = match username {
        Some(name) => name.to_string(),
        None => identity.process_user()?,
    };
    log.debug(&format!("acting for user {name}"));

    if !identity.username_matches_uid(&name)? && !identity.is_root() {
        return Err(FrontendError::PermissionDenied { username: name }.into());
    }
    Ok(name)
}

/// Runs machine and user appliers for one user session.
pub struct FrontendManager {
    ctx: Context,
    identity: Arc<dyn Identity>,
    session: UserSession,
    target: Target,
    machine_appliers: Vec<Box<dyn MachineApplier>>,
    user_appliers: Vec<Box<dyn UserApplier>>,
}

impl fmt::Debug for FrontendManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrontendManager")
            .field("session", &self.session)
            .field("target", &self.target)
            .field("machine_appliers", &self.machine_applier_names())
            .field("user_appliers", &self.user_applier_names())
            .finish_non_exhaustive()
    }
}

impl FrontendManager {
    /// Resolve the user session and instantiate every applier.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::PermissionDenied`] if the process may not act
    /// for `username`, or an error if the user's home cannot be found.
    pub fn new(
        ctx: Context,
        identity: Arc<dyn Identity>,
        username: Option<&str>,
        target: Target,
    ) -> Result<Self> {
        let username = determine_username(identity.as_ref(), ctx.log.as_ref(), username)?;
        let domain = ctx.store.get_info("domain");
        let sid = resolve_sid(
            ctx.executor.as_ref(),
            ctx.log.as_ref(),
            domain.as_deref(),
            &username,
        );
        let home = identity.home_dir(&username)?;
        ctx.log.debug(&format!("{username}: SID {sid}, home {}", home.display()));
        let session = UserSession {
            username,
            sid,
            home,
        };

        let control = Box::new(ControlApplier::new(&ctx));
        let polkit = Box::new(PolkitApplier::new(&ctx));
        let systemd = Box::new(SystemdApplier::new(&ctx));
        let firefox = Box::new(FirefoxApplier::new(&ctx));
        let chromium = Box::new(ChromiumApplier::new(&ctx));
        let shortcuts = Box::new(ShortcutsApplier::new(&ctx));
        // Units come up before anything is configured against them.
        let machine_appliers: Vec<Box<dyn MachineApplier>> =
            vec![systemd, control, polkit, firefox, chromium, shortcuts];

        let user_appliers: Vec<Box<dyn UserApplier>> = vec![
            Box::new(ShortcutsApplierUser::new(&ctx, &session)),
            Box::new(FoldersApplierUser::new(&ctx, &session)),
            Box::new(PolkitApplierUser::new(&ctx, &session)),
        ];

        Ok(Self::with_appliers(
            ctx,
            identity,
            session,
            target,
            machine_appliers,
            user_appliers,
        ))
    }

    /// Assemble a manager from already-built parts.
    #[must_use]
    pub fn with_appliers(
        ctx: Context,
        identity: Arc<dyn Identity>,
        session: UserSession,
        target: Target,
        machine_appliers: Vec<Box<dyn MachineApplier>>,
        user_appliers: Vec<Box<dyn UserApplier>>,
    ) -> Self {
        Self {
            ctx,
            identity,
            session,
            target,
            machine_appliers,
            user_appliers,
        }
    }

    /// The session policy is applied for.
    #[must_use]
    pub const fn session(&self) -> &UserSession {
        &self.session
    }

    /// Machine applier names in execution order.
    #[must_use]
    pub fn machine_applier_names(&self) -> Vec<&'static str> {
        self.machine_appliers.iter().map(|a| a.name()).collect()
    }

    /// User applier names in execution order.
    #[must_use]
    pub fn user_applier_names(&self) -> Vec<&'static str> {
        self.user_appliers.iter().map(|a| a.name()).collect()
    }

    /// Run every machine applier.  Without root this logs an error and
    /// does nothing.
    pub fn machine_apply(&self) {
        if !self.identity.is_root() {
            self.ctx
                .log
                .error("machine policy requires root privileges");
            return;
        }
        for applier in &self.machine_appliers {
            execute(&self.ctx, applier.name(), || applier.apply(&self.ctx));
        }
    }

    /// Run every user applier, in the admin context when running as root.
    pub fn user_apply(&self) {
        let admin = self.identity.is_root();
        for applier in &self.user_appliers {
            execute(&self.ctx, applier.name(), || {
                if admin {
                    applier.admin_context_apply(&self.ctx)
                } else {
                    applier.user_context_apply(&self.ctx)
                }
            });
        }
    }

    /// Apply the parts of the policy selected by the target.
    ///
    /// User policy is skipped when the session SID is the machine's own.
    pub fn apply_parameters(&self) {
        if self.target.includes_machine() {
            self.machine_apply();
        }
        let machine_sid = self.ctx.store.get_info("machine_sid");
        if machine_sid.as_deref() != Some(self.session.sid.as_str()) && self.target.includes_user()
        {
            self.user_apply();
        } else {
            self.ctx.log.debug("user policy not applicable");
        }
    }
}
