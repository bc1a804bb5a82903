//! Facility states from the `Control` policy branch.
use anyhow::Result;

use super::{ApplierResult, Context, MachineApplier, check_enabled, process_resources};
use crate::resources::control::{ControlResource, ControlValue};

/// Registry branch mapping facility names to states.
pub const CONTROL_BRANCH: &str = "Software\\BaseALT\\Policies\\Control";

/// Switches `control(8)` facilities.
#[derive(Debug)]
pub struct ControlApplier {
    enabled: bool,
}

impl ControlApplier {
    /// Module name.
    pub const NAME: &'static str = "ControlApplier";

    /// Create the applier.
    #[must_use]
    pub fn new(ctx: &Context) -> Self {
        Self {
            enabled: check_enabled(ctx.store.as_ref(), Self::NAME, false),
        }
    }
}

impl MachineApplier for ControlApplier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, ctx: &Context) -> Result<ApplierResult> {
        if !self.enabled {
            return Ok(ApplierResult::Disabled);
        }
        let entries = ctx.store.filter_hklm_entries(CONTROL_BRANCH);
        if entries.is_empty() {
            return Ok(ApplierResult::Skipped("no facilities configured".to_string()));
        }

        let facilities = entries.iter().map(|entry| {
            ControlResource::new(
                entry.value_name().to_string(),
                ControlValue::parse(&entry.data),
                ctx.executor.as_ref(),
            )
        });
        Ok(process_resources(ctx, facilities, "set", false)?.finish(ctx))
    }
}
