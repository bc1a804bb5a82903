//! Domain-specific error types for the policy applier.
//!
//! Internal modules return [`anyhow::Result`] and raise these typed errors
//! where a caller (or a test) may want to tell failures apart.  Command
//! handlers at the CLI boundary only see [`anyhow::Error`].
//!
//! # Error families
//!
//! ```text
//! PolicyError   : malformed policy objects
//! FrontendError : identity and privilege checks
//! StoreError    : policy store loading
//! ```

use thiserror::Error;

/// Errors raised while turning raw policy data into policy objects.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// The action letter of a folder or shortcut policy is not one of `C`, `U`, `D`, `R`.
    #[error("Unknown action code '{0}'")]
    UnknownAction(String),

    /// A serialized shortcut lacks a required key.
    #[error("Shortcut is missing required key '{0}'")]
    MissingKey(String),

    /// A serialized shortcut is not valid JSON.
    #[error("Invalid shortcut JSON: {0}")]
    InvalidJson(String),

    /// A GPO `Shortcuts.xml` document could not be parsed.
    #[error("Invalid shortcuts XML in {file}: {message}")]
    InvalidXml {
        /// File (or `<inline>`) the document came from.
        file: String,
        /// Parser message.
        message: String,
    },
}

/// Errors raised while resolving the acting user.
#[derive(Error, Debug)]
pub enum FrontendError {
    /// The requested username is not the process owner and the process is not root.
    #[error("Current process UID does not match specified username '{username}'")]
    PermissionDenied {
        /// Username that was requested.
        username: String,
    },

    /// The user does not exist in the password database.
    #[error("Unknown user '{0}'")]
    UnknownUser(String),
}

/// Errors raised while loading the policy store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store file exists but could not be read.
    #[error("IO error reading policy store {path}: {source}")]
    Io {
        /// Path of the store file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The store file is not valid TOML or has an unexpected shape.
    #[error("Invalid policy store {path}: {message}")]
    Parse {
        /// Path of the store file (or `<inline>`).
        path: String,
        /// Parser message.
        message: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn unknown_action_display() {
        let e = PolicyError::UnknownAction("X".to_string());
        assert_eq!(e.to_string(), "Unknown action code 'X'");
    }

    #[test]
    fn missing_key_display() {
        let e = PolicyError::MissingKey("dest".to_string());
        assert_eq!(e.to_string(), "Shortcut is missing required key 'dest'");
    }

    #[test]
    fn invalid_xml_display() {
        let e = PolicyError::InvalidXml {
            file: "Shortcuts.xml".to_string(),
            message: "unexpected end".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Invalid shortcuts XML in Shortcuts.xml: unexpected end"
        );
    }

    #[test]
    fn permission_denied_display() {
        let e = FrontendError::PermissionDenied {
            username: "alice".to_string(),
        };
        assert!(e.to_string().contains("does not match"));
        assert!(e.to_string().contains("alice"));
    }

    #[test]
    fn store_io_has_source() {
        use std::error::Error as StdError;
        let e = StoreError::Io {
            path: "/var/cache/gpoa/registry.toml".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("registry.toml"));
    }

    #[test]
    fn typed_errors_survive_anyhow_round_trip() {
        let err: anyhow::Error = PolicyError::MissingKey("guid".to_string()).into();
        let typed = err
            .downcast_ref::<PolicyError>()
            .expect("downcast to PolicyError");
        assert!(matches!(typed, PolicyError::MissingKey(k) if k == "guid"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<PolicyError>();
        assert_send_sync::<FrontendError>();
        assert_send_sync::<StoreError>();
    }
}
