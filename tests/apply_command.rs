#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `apply` command.
//!
//! These tests run the real appliers through [`FrontendManager`] against a
//! scratch tree and check the recorded applier order, the privilege and
//! target gating, and the artifacts each applier leaves behind.

mod common;

use common::*;
use gpoa::appliers::GPUPDATE_BRANCH;
use gpoa::appliers::browser::{CHROMIUM_BRANCH, FIREFOX_BRANCH};
use gpoa::appliers::polkit::DENY_ALL;
use gpoa::frontend::Target;
use gpoa::policy::folder::FolderObject;
use gpoa::store::RegistryStore;

// ---------------------------------------------------------------------------
// Snapshot: applier order
// ---------------------------------------------------------------------------

/// Every applier of a full root run, in execution order, with its outcome
/// over an empty store.
#[test]
fn full_run_applier_order() {
    let machine = TestMachineBuilder::new().build();
    let (manager, log) = machine.manager();
    manager.apply_parameters();

    insta::assert_snapshot!(applier_lines(&log).join("\n"), @r"
    SystemdApplier: skipped
    ControlApplier: skipped
    PolkitApplier: ok
    FirefoxApplier: skipped
    ChromiumApplier: skipped
    ShortcutsApplier: skipped
    ShortcutsApplierUser: skipped
    FoldersApplierUser: skipped
    PolkitApplierUser: ok
    ");
}

// ---------------------------------------------------------------------------
// Privilege and target gating
// ---------------------------------------------------------------------------

/// Without root, machine policy is refused and nothing is written.
#[test]
fn machine_apply_without_root_has_no_effect() {
    let machine = TestMachineBuilder::new()
        .unprivileged()
        .target(Target::Computer)
        .build();
    let (manager, log) = machine.manager();
    manager.apply_parameters();

    assert!(log.applier_entries().is_empty());
    assert!(!machine.settings().polkit_rules_dir.exists());
    assert_eq!(log.failure_count(), 0);
}

/// A regular user gets user policy in their own context.
#[test]
fn unprivileged_run_applies_user_context() {
    let machine = TestMachineBuilder::new()
        .unprivileged()
        .store(|s| {
            s.with_folder(
                "local-alice",
                FolderObject {
                    path: "%HOME%\\Documents\\Reports".to_string(),
                    action: "C".to_string(),
                    delete_folder: String::new(),
                    delete_sub_folders: String::new(),
                    delete_files: String::new(),
                },
            )
        })
        .build();
    let (manager, log) = machine.manager();
    manager.apply_parameters();

    assert!(machine.home().join("Documents/Reports").is_dir());
    let lines = applier_lines(&log);
    assert!(lines.contains(&"FoldersApplierUser: ok".to_string()));
    assert!(lines.contains(&"PolkitApplierUser: skipped".to_string()));
    assert!(!lines.iter().any(|l| l.starts_with("PolkitApplier:")));
}

/// User policy is not applied for the machine account itself.
#[test]
fn machine_sid_session_skips_user_policy() {
    let machine = TestMachineBuilder::new()
        .store(|s| s.with_info("machine_sid", "local-alice"))
        .build();
    let (manager, log) = machine.manager();
    manager.apply_parameters();

    assert!(
        !applier_lines(&log)
            .iter()
            .any(|l| l.contains("ApplierUser"))
    );
}

/// Target `User` leaves machine appliers alone even as root.
#[test]
fn user_target_skips_machine_policy() {
    let machine = TestMachineBuilder::new().target(Target::User).build();
    let (manager, log) = machine.manager();
    manager.apply_parameters();

    let lines = applier_lines(&log);
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.contains("ApplierUser")));
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// With no store value the machine rule keeps its default binding.
#[test]
fn polkit_default_binding_produces_rule() {
    let machine = TestMachineBuilder::new().target(Target::Computer).build();
    let (manager, _log) = machine.manager();
    manager.machine_apply();

    let rule = machine
        .settings()
        .polkit_rules_dir
        .join("49-gpoa_disk_permissions.rules");
    let text = std::fs::read_to_string(rule).unwrap();
    assert!(text.contains("0 == 1"));
}

/// A policy store read from disk drives the browser appliers.
#[test]
fn store_file_drives_browser_policies() {
    let machine = TestMachineBuilder::new().target(Target::Computer).build();
    let store_path = machine.path().join("registry.toml");
    std::fs::write(
        &store_path,
        format!(
            "[hklm]\n'{FIREFOX_BRANCH}\\DisableTelemetry' = 1\n'{FIREFOX_BRANCH}\\Homepage\\URL' = 'https://example.org'\n'{CHROMIUM_BRANCH}\\RestoreOnStartup' = 4\n'{DENY_ALL}' = 1\n"
        ),
    )
    .unwrap();
    let machine = TestMachine {
        store: RegistryStore::load(&store_path).unwrap(),
        ..machine
    };
    let (manager, log) = machine.manager();
    manager.apply_parameters();
    assert_eq!(log.failure_count(), 0);

    let settings = machine.settings();
    let firefox: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(settings.firefox_policy_dirs[0].join("policies.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(firefox["policies"]["DisableTelemetry"], true);
    assert_eq!(firefox["policies"]["Homepage"]["URL"], "https://example.org");

    let chromium: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(settings.chromium_policy_dir.join("policies.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(chromium["RestoreOnStartup"], 4);

    let rule = std::fs::read_to_string(
        settings
            .polkit_rules_dir
            .join("49-gpoa_disk_permissions.rules"),
    )
    .unwrap();
    assert!(rule.contains("1 == 1"));
}

/// A module switched off by policy is reported as disabled.
#[test]
fn gpupdate_switch_disables_module() {
    let machine = TestMachineBuilder::new()
        .target(Target::Computer)
        .store(|s| s.with_hklm(&format!("{GPUPDATE_BRANCH}\\PolkitApplier"), "0"))
        .build();
    let (manager, log) = machine.manager();
    manager.apply_parameters();

    assert!(applier_lines(&log).contains(&"PolkitApplier: disabled".to_string()));
    assert!(!machine.settings().polkit_rules_dir.exists());
}

/// A unit that cannot be switched is skipped; the run carries on.
#[test]
fn unit_failure_is_not_fatal() {
    let machine = TestMachineBuilder::new()
        .target(Target::Computer)
        .store(|s| s.with_hklm("Software\\BaseALT\\Policies\\SystemdUnits\\sshd.service", "1"))
        .build();
    let (manager, log) = machine.manager();
    manager.apply_parameters();

    let lines = applier_lines(&log);
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "SystemdApplier: ok");
    assert_eq!(lines[2], "PolkitApplier: ok");
}
