//! Command: apply machine and user policy.
use std::sync::Arc;

use anyhow::Result;

use crate::appliers::Context;
use crate::cli::{ApplyOpts, GlobalOpts};
use crate::exec::SystemExecutor;
use crate::frontend::FrontendManager;
use crate::identity::SystemIdentity;
use crate::logging::{Log, Logger};

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if settings or the store cannot be loaded, the process
/// may not act for the requested user, or any applier failed.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("gpoa {}", super::version::version()));

    let setup = super::CommandSetup::init(global, log)?;
    let ctx = Context::new(
        Arc::new(setup.store),
        setup.settings,
        Arc::clone(log) as Arc<dyn Log>,
        Arc::new(SystemExecutor),
    );

    log.stage("Resolving user");
    let manager = FrontendManager::new(
        ctx,
        Arc::new(SystemIdentity),
        opts.username.as_deref(),
        opts.target,
    )?;
    let session = manager.session();
    log.info(&format!(
        "user: {} ({}), target: {}",
        session.username, session.sid, opts.target
    ));

    manager.apply_parameters();

    super::finish_run(log)
}
