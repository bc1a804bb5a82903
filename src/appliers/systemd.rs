//! Unit switches from the `SystemdUnits` policy branch.
use anyhow::Result;

use super::{ApplierResult, Context, MachineApplier, check_enabled, process_resources};
use crate::resources::systemd_unit::SystemdUnitResource;

/// Registry branch listing units to enable (`1`) or disable (`0`).
pub const SYSTEMD_BRANCH: &str = "Software\\BaseALT\\Policies\\SystemdUnits";

/// Enables and disables system units.
#[derive(Debug)]
pub struct SystemdApplier {
    enabled: bool,
}

impl SystemdApplier {
    /// Module name.
    pub const NAME: &'static str = "SystemdApplier";

    /// Create the applier.
    #[must_use]
    pub fn new(ctx: &Context) -> Self {
        Self {
            enabled: check_enabled(ctx.store.as_ref(), Self::NAME, false),
        }
    }
}

impl MachineApplier for SystemdApplier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, ctx: &Context) -> Result<ApplierResult> {
        if !self.enabled {
            return Ok(ApplierResult::Disabled);
        }
        let entries = ctx.store.filter_hklm_entries(SYSTEMD_BRANCH);
        if entries.is_empty() {
            return Ok(ApplierResult::Skipped("no units configured".to_string()));
        }

        let mut units = Vec::new();
        for entry in &entries {
            let enable = match entry.data.trim() {
                "1" => true,
                "0" => false,
                other => {
                    ctx.log.warn(&format!(
                        "unit {}: unexpected value '{other}'",
                        entry.value_name()
                    ));
                    continue;
                }
            };
            units.push(SystemdUnitResource::new(
                entry.value_name().to_string(),
                enable,
                ctx.executor.as_ref(),
            ));
        }

        Ok(process_resources(ctx, units, "switch", false)?.finish(ctx))
    }
}
