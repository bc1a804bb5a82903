// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed machine (settings rooted in a
// scratch tree, a fake identity, a no-op executor) and a fluent builder so
// each integration test can set up an isolated policy run without
// repeating boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, bail};

use gpoa::appliers::Context;
use gpoa::config::Settings;
use gpoa::exec::{ExecResult, Executor};
use gpoa::frontend::{FrontendManager, Target};
use gpoa::identity::Identity;
use gpoa::logging::{ApplierStatus, Log, Logger};
use gpoa::store::RegistryStore;

/// An [`Identity`] with a fixed answer for every question.
#[derive(Debug, Clone)]
pub struct FakeIdentity {
    pub root: bool,
    pub user: String,
    pub home: PathBuf,
}

impl Identity for FakeIdentity {
    fn is_root(&self) -> bool {
        self.root
    }

    fn process_user(&self) -> Result<String> {
        Ok(self.user.clone())
    }

    fn username_matches_uid(&self, username: &str) -> Result<bool> {
        Ok(username == self.user)
    }

    fn home_dir(&self, _username: &str) -> Result<PathBuf> {
        Ok(self.home.clone())
    }
}

/// An [`Executor`] for machines where no external command may run.
#[derive(Debug, Default)]
pub struct NoopExecutor;

impl Executor for NoopExecutor {
    fn run(&self, program: &str, _args: &[&str]) -> Result<ExecResult> {
        bail!("{program} is not available in tests")
    }

    fn run_unchecked(&self, _program: &str, _args: &[&str]) -> Result<ExecResult> {
        Ok(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: false,
            code: Some(1),
        })
    }
}

/// A scratch machine: every output directory lives under one temp dir.
pub struct TestMachine {
    /// Temporary directory holding outputs and the user's home.
    pub root: tempfile::TempDir,
    pub store: RegistryStore,
    pub root_privileges: bool,
    pub target: Target,
}

impl TestMachine {
    /// Root of the scratch tree.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// The user's home directory.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home/alice")
    }

    /// Settings pointing into the scratch tree.
    pub fn settings(&self) -> Settings {
        Settings::rooted_at(self.root.path())
    }

    /// Build the frontend for user `alice` and a logger that records results.
    pub fn manager(&self) -> (FrontendManager, Arc<Logger>) {
        let log = Arc::new(Logger::new("test"));
        let ctx = Context::new(
            Arc::new(self.store.clone()),
            self.settings(),
            Arc::clone(&log) as Arc<dyn Log>,
            Arc::new(NoopExecutor),
        );
        let identity = FakeIdentity {
            root: self.root_privileges,
            user: "alice".to_string(),
            home: self.home(),
        };
        let manager = FrontendManager::new(ctx, Arc::new(identity), None, self.target)
            .expect("build frontend");
        (manager, log)
    }
}

/// `name: status` lines for every recorded applier, in order.
pub fn applier_lines(log: &Logger) -> Vec<String> {
    log.applier_entries()
        .iter()
        .map(|e| {
            let status = match e.status {
                ApplierStatus::Ok => "ok",
                ApplierStatus::Disabled => "disabled",
                ApplierStatus::Skipped => "skipped",
                ApplierStatus::Failed => "failed",
            };
            format!("{}: {status}", e.name)
        })
        .collect()
}

/// Fluent builder for [`TestMachine`].
pub struct TestMachineBuilder {
    machine: TestMachine,
}

impl TestMachineBuilder {
    /// Begin with an empty store, root privileges and target `All`.
    pub fn new() -> Self {
        Self {
            machine: TestMachine {
                root: tempfile::tempdir().expect("create temp dir"),
                store: RegistryStore::new(),
                root_privileges: true,
                target: Target::All,
            },
        }
    }

    /// Modify the policy store.
    pub fn store(mut self, f: impl FnOnce(RegistryStore) -> RegistryStore) -> Self {
        self.machine.store = f(self.machine.store);
        self
    }

    /// Run as a regular user instead of root.
    pub fn unprivileged(mut self) -> Self {
        self.machine.root_privileges = false;
        self
    }

    /// Select which half of the policy to apply.
    pub fn target(mut self, target: Target) -> Self {
        self.machine.target = target;
        self
    }

    /// Finalise and return the machine.
    pub fn build(self) -> TestMachine {
        std::fs::create_dir_all(self.machine.home()).expect("create home");
        self.machine
    }
}
