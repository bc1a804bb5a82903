//! PolicyKit rules for removable storage.
use anyhow::Result;

use super::{ApplierResult, Context, MachineApplier, UserApplier, UserSession, check_enabled};
use crate::resources::Applicable;
use crate::resources::rule::{DISK_PERMISSIONS, DISK_PERMISSIONS_USER, RuleTemplateBinding};

/// Registry value that denies access to all removable storage.
pub const DENY_ALL: &str = "Software\\Policies\\Microsoft\\Windows\\RemovableStorageDevices\\Deny_All";

fn generate(ctx: &Context, bindings: &[RuleTemplateBinding]) -> Result<ApplierResult> {
    for binding in bindings {
        let rule = binding.generate(
            &ctx.settings.template_dir,
            &ctx.settings.polkit_rules_dir,
        )?;
        let change = rule.apply()?;
        ctx.log
            .debug(&format!("{}: {change:?}", rule.description()));
    }
    Ok(ApplierResult::Ok)
}

/// Machine-wide PolicyKit rules.
#[derive(Debug)]
pub struct PolkitApplier {
    bindings: Vec<RuleTemplateBinding>,
    enabled: bool,
}

impl PolkitApplier {
    /// Module name.
    pub const NAME: &'static str = "PolkitApplier";

    /// Bind the rule templates to the machine's store values.
    #[must_use]
    pub fn new(ctx: &Context) -> Self {
        let mut binding = RuleTemplateBinding::new(DISK_PERMISSIONS);
        if let Some(deny_all) = ctx.store.filter_hklm_entries(DENY_ALL).first() {
            ctx.log
                .debug(&format!("Deny_All setting found: {}", deny_all.data));
            binding.set("Deny_All", &deny_all.data);
        } else {
            ctx.log
                .debug("Deny_All setting not found; keeping defaults");
        }
        Self {
            bindings: vec![binding],
            enabled: check_enabled(ctx.store.as_ref(), Self::NAME, false),
        }
    }

    /// The bound templates.
    #[must_use]
    pub fn bindings(&self) -> &[RuleTemplateBinding] {
        &self.bindings
    }
}

impl MachineApplier for PolkitApplier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, ctx: &Context) -> Result<ApplierResult> {
        if !self.enabled {
            return Ok(ApplierResult::Disabled);
        }
        ctx.log.debug("generating PolicyKit rules");
        generate(ctx, &self.bindings)
    }
}

/// Per-user PolicyKit rules.
#[derive(Debug)]
pub struct PolkitApplierUser {
    bindings: Vec<RuleTemplateBinding>,
    enabled: bool,
}

impl PolkitApplierUser {
    /// Module name.
    pub const NAME: &'static str = "PolkitApplierUser";

    /// Bind the rule templates to the user's store values.
    #[must_use]
    pub fn new(ctx: &Context, session: &UserSession) -> Self {
        let mut binding =
            RuleTemplateBinding::new(DISK_PERMISSIONS_USER).for_user(&session.username);
        if let Some(deny_all) = ctx
            .store
            .filter_hkcu_entries(&session.sid, DENY_ALL)
            .first()
        {
            ctx.log.debug(&format!(
                "Deny_All setting for {} found: {}",
                session.username, deny_all.data
            ));
            binding.set("Deny_All", &deny_all.data);
            binding.set("User", &session.username);
        } else {
            ctx.log.debug(&format!(
                "Deny_All setting for {} not found; keeping defaults",
                session.username
            ));
        }
        Self {
            bindings: vec![binding],
            enabled: check_enabled(ctx.store.as_ref(), Self::NAME, false),
        }
    }

    /// The bound templates.
    #[must_use]
    pub fn bindings(&self) -> &[RuleTemplateBinding] {
        &self.bindings
    }
}

impl UserApplier for PolkitApplierUser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn user_context_apply(&self, _ctx: &Context) -> Result<ApplierResult> {
        Ok(ApplierResult::Skipped(
            "rules are written from the administrator context".to_string(),
        ))
    }

    fn admin_context_apply(&self, ctx: &Context) -> Result<ApplierResult> {
        if !self.enabled {
            return Ok(ApplierResult::Disabled);
        }
        ctx.log.debug("generating per-user PolicyKit rules");
        generate(ctx, &self.bindings)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::appliers::GPUPDATE_BRANCH;
    use crate::appliers::test_helpers::make_context;
    use crate::exec::test_helpers::MockExecutor;
    use crate::store::RegistryStore;
    use std::path::PathBuf;

    fn session() -> UserSession {
        UserSession {
            username: "alice".to_string(),
            sid: "S-1-5-21-1-1104".to_string(),
            home: PathBuf::from("/home/alice"),
        }
    }

    #[test]
    fn machine_rule_uses_defaults_without_store_value() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, log) = make_context(
            RegistryStore::new(),
            dir.path(),
            MockExecutor::with_responses(vec![]),
        );
        let applier = PolkitApplier::new(&ctx);
        assert_eq!(
            applier.bindings()[0].variables.get("Deny_All").map(String::as_str),
            Some("0")
        );
        assert!(log.contains("keeping defaults"));

        assert_eq!(applier.apply(&ctx).unwrap(), ApplierResult::Ok);
        let rule = ctx
            .settings
            .polkit_rules_dir
            .join("49-gpoa_disk_permissions.rules");
        let text = std::fs::read_to_string(rule).unwrap();
        assert!(text.contains("0 == 1"));
    }

    #[test]
    fn machine_rule_binds_store_value() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _log) = make_context(
            RegistryStore::new().with_hklm(DENY_ALL, "1"),
            dir.path(),
            MockExecutor::with_responses(vec![]),
        );
        PolkitApplier::new(&ctx).apply(&ctx).unwrap();
        let text = std::fs::read_to_string(
            ctx.settings
                .polkit_rules_dir
                .join("49-gpoa_disk_permissions.rules"),
        )
        .unwrap();
        assert!(text.contains("1 == 1"));
    }

    #[test]
    fn disabled_machine_applier_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _log) = make_context(
            RegistryStore::new().with_hklm(&format!("{GPUPDATE_BRANCH}\\PolkitApplier"), "0"),
            dir.path(),
            MockExecutor::with_responses(vec![]),
        );
        assert_eq!(
            PolkitApplier::new(&ctx).apply(&ctx).unwrap(),
            ApplierResult::Disabled
        );
        assert!(!ctx.settings.polkit_rules_dir.exists());
    }

    #[test]
    fn user_rule_binds_user_only_when_value_present() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _log) = make_context(
            RegistryStore::new(),
            dir.path(),
            MockExecutor::with_responses(vec![]),
        );
        let applier = PolkitApplierUser::new(&ctx, &session());
        assert_eq!(
            applier.bindings()[0].variables.get("User").map(String::as_str),
            Some("")
        );

        let store = RegistryStore::new().with_hkcu("S-1-5-21-1-1104", DENY_ALL, "1");
        let (ctx, _log) = make_context(store, dir.path(), MockExecutor::with_responses(vec![]));
        let applier = PolkitApplierUser::new(&ctx, &session());
        let vars = &applier.bindings()[0].variables;
        assert_eq!(vars.get("User").map(String::as_str), Some("alice"));
        assert_eq!(vars.get("Deny_All").map(String::as_str), Some("1"));
    }

    #[test]
    fn user_rule_written_only_from_admin_context() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new().with_hkcu("S-1-5-21-1-1104", DENY_ALL, "1");
        let (ctx, _log) = make_context(store, dir.path(), MockExecutor::with_responses(vec![]));
        let applier = PolkitApplierUser::new(&ctx, &session());
        let rule = ctx
            .settings
            .polkit_rules_dir
            .join("48-gpoa_disk_permissions_user.alice.rules");

        assert!(matches!(
            applier.user_context_apply(&ctx).unwrap(),
            ApplierResult::Skipped(_)
        ));
        assert!(!rule.exists());

        assert_eq!(applier.admin_context_apply(&ctx).unwrap(), ApplierResult::Ok);
        let text = std::fs::read_to_string(rule).unwrap();
        assert!(text.contains("subject.user == \"alice\""));
    }
}
