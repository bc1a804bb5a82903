//! Folder policies for one user.
use anyhow::Result;

use super::{ApplierResult, Context, UserApplier, UserSession, check_enabled, process_resources};
use crate::policy::folder::FolderPolicy;
use crate::resources::folder::FolderResource;

/// Creates, replaces and deletes directories in the user's home.
#[derive(Debug)]
pub struct FoldersApplierUser {
    session: UserSession,
    enabled: bool,
}

impl FoldersApplierUser {
    /// Module name.
    pub const NAME: &'static str = "FoldersApplierUser";

    /// Create the applier for `session`.
    #[must_use]
    pub fn new(ctx: &Context, session: &UserSession) -> Self {
        Self {
            session: session.clone(),
            enabled: check_enabled(ctx.store.as_ref(), Self::NAME, false),
        }
    }
}

impl UserApplier for FoldersApplierUser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn user_context_apply(&self, ctx: &Context) -> Result<ApplierResult> {
        if !self.enabled {
            return Ok(ApplierResult::Disabled);
        }
        let objects = ctx.store.get_folders(&self.session.sid);
        if objects.is_empty() {
            return Ok(ApplierResult::Skipped("no folder policies".to_string()));
        }

        // Resolve everything first: one bad action code aborts the whole set.
        let policies = objects
            .iter()
            .map(|obj| FolderPolicy::new(obj, Some(&self.session.home)))
            .collect::<Result<Vec<_>>>()?;

        let folders = policies
            .into_iter()
            .map(|p| FolderResource::new(p, ctx.fs_ops.as_ref()));
        Ok(process_resources(ctx, folders, "update", true)?.finish(ctx))
    }

    fn admin_context_apply(&self, _ctx: &Context) -> Result<ApplierResult> {
        Ok(ApplierResult::Skipped(
            "folders are managed from the user session".to_string(),
        ))
    }
}
