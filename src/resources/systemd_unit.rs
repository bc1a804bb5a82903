//! systemd units switched through `systemctl`.
use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// A system unit that policy wants enabled or disabled.
#[derive(Debug)]
pub struct SystemdUnitResource<'a> {
    /// Unit name (e.g. "sshd.service").
    pub name: String,
    /// Desired state.
    pub enable: bool,
    executor: &'a dyn Executor,
}

impl<'a> SystemdUnitResource<'a> {
    /// Create a new systemd unit resource.
    #[must_use]
    pub const fn new(name: String, enable: bool, executor: &'a dyn Executor) -> Self {
        Self {
            name,
            enable,
            executor,
        }
    }
}

impl Applicable for SystemdUnitResource<'_> {
    fn description(&self) -> String {
        self.name.clone()
    }

    fn apply(&self) -> Result<ResourceChange> {
        if !self.needs_change()? {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        let verb = if self.enable { "enable" } else { "disable" };
        self.executor
            .run("systemctl", &[verb, "--now", &self.name])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SystemdUnitResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let result = self
            .executor
            .run_unchecked("systemctl", &["is-enabled", &self.name])?;
        let current = result.stdout.trim().to_string();
        let enabled = result.success && current == "enabled";
        Ok(if enabled == self.enable {
            ResourceState::Correct
        } else if current.is_empty() {
            ResourceState::Missing
        } else {
            ResourceState::Incorrect { current }
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;

    #[test]
    fn enables_disabled_unit() {
        let exec = MockExecutor::with_responses(vec![(false, "disabled"), (true, "")]);
        let unit = SystemdUnitResource::new("sshd.service".to_string(), true, &exec);
        assert_eq!(unit.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(
            exec.calls(),
            vec![
                "systemctl is-enabled sshd.service".to_string(),
                "systemctl enable --now sshd.service".to_string(),
            ]
        );
    }

    #[test]
    fn already_enabled_unit_is_left_alone() {
        let exec = MockExecutor::with_responses(vec![(true, "enabled\n")]);
        let unit = SystemdUnitResource::new("sshd.service".to_string(), true, &exec);
        assert_eq!(unit.apply().unwrap(), ResourceChange::AlreadyCorrect);
        assert_eq!(exec.calls().len(), 1);
    }

    #[test]
    fn disables_enabled_unit() {
        let exec = MockExecutor::with_responses(vec![(true, "enabled"), (true, "")]);
        let unit = SystemdUnitResource::new("cups.service".to_string(), false, &exec);
        assert_eq!(
            unit.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "enabled".to_string()
            }
        );
    }

    #[test]
    fn failing_systemctl_is_an_error() {
        let exec = MockExecutor::with_responses(vec![(false, "disabled"), (false, "")]);
        let unit = SystemdUnitResource::new("x.service".to_string(), true, &exec);
        assert!(unit.apply().is_err());
    }
}
