//! `control(8)` facilities: named switches with a fixed list of states.
use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// The state a policy asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlValue {
    /// Position in the facility's `list` output.
    Index(usize),
    /// State name.
    Name(String),
}

impl ControlValue {
    /// Interpret registry data: numbers index the state list, anything else
    /// names a state.
    #[must_use]
    pub fn parse(data: &str) -> Self {
        let data = data.trim();
        data.parse::<usize>()
            .map_or_else(|_| Self::Name(data.to_string()), Self::Index)
    }
}

/// One facility and its desired state.
#[derive(Debug)]
pub struct ControlResource<'a> {
    /// Facility name (e.g. "sudo").
    pub facility: String,
    /// Desired state.
    pub value: ControlValue,
    executor: &'a dyn Executor,
}

impl<'a> ControlResource<'a> {
    /// Create a new control facility resource.
    #[must_use]
    pub const fn new(facility: String, value: ControlValue, executor: &'a dyn Executor) -> Self {
        Self {
            facility,
            value,
            executor,
        }
    }

    /// Resolve the desired state name, or `None` if the index is out of range.
    ///
    /// # Errors
    ///
    /// Returns an error if the facility's state list cannot be queried.
    pub fn desired_status(&self) -> Result<Option<String>> {
        match &self.value {
            ControlValue::Name(name) => Ok(Some(name.clone())),
            ControlValue::Index(index) => {
                let list = self.executor.run("control", &[&self.facility, "list"])?;
                Ok(list
                    .stdout
                    .split_whitespace()
                    .nth(*index)
                    .map(String::from))
            }
        }
    }
}

impl Applicable for ControlResource<'_> {
    fn description(&self) -> String {
        self.facility.clone()
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
            ResourceState::Missing | ResourceState::Incorrect { .. } => {
                let Some(status) = self.desired_status()? else {
                    return Ok(ResourceChange::Skipped {
                        reason: "status index out of range".to_string(),
                    });
                };
                self.executor.run("control", &[&self.facility, &status])?;
                Ok(ResourceChange::Applied)
            }
        }
    }
}

impl Resource for ControlResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let Some(desired) = self.desired_status()? else {
            return Ok(ResourceState::Invalid {
                reason: format!("{:?} is not a state of {}", self.value, self.facility),
            });
        };
        let result = self.executor.run_unchecked("control", &[&self.facility])?;
        let current = result.stdout.trim().to_string();
        Ok(if !result.success || current.is_empty() {
            ResourceState::Missing
        } else if current == desired {
            ResourceState::Correct
        } else {
            ResourceState::Incorrect { current }
        })
    }
}
