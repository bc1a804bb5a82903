//! Folder and shortcut action codes.
use std::fmt;

use anyhow::Result;

use crate::error::PolicyError;

/// What a folder or shortcut policy asks for.
///
/// # Examples
///
/// ```
/// use gpoa::policy::action::{PolicyAction, resolve};
///
/// assert_eq!(resolve("R").unwrap(), PolicyAction::Replace);
/// assert!(resolve("X").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    /// Create the object if it does not exist.
    Create,
    /// Ensure the object exists with the configured properties.
    Update,
    /// Remove the object.
    Delete,
    /// Remove the object, then create it again.
    Replace,
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// Map a GPO action letter to a [`PolicyAction`].
///
/// Surrounding whitespace is ignored; the letter itself must match exactly.
///
/// # Errors
///
/// Returns [`PolicyError::UnknownAction`] for anything other than `C`, `U`,
/// `D` or `R`.
pub fn resolve(letter: &str) -> Result<PolicyAction> {
    match letter.trim() {
        "C" => Ok(PolicyAction::Create),
        "U" => Ok(PolicyAction::Update),
        "D" => Ok(PolicyAction::Delete),
        "R" => Ok(PolicyAction::Replace),
        other => Err(PolicyError::UnknownAction(other.to_string()).into()),
    }
}
