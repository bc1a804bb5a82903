//! Who the process runs as, and how users map to domain SIDs.
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use nix::unistd::{Uid, User};

use crate::error::FrontendError;
use crate::exec::Executor;
use crate::logging::Log;

/// Process and account queries the frontend depends on.
#[cfg_attr(test, mockall::automock)]
pub trait Identity: Send + Sync + std::fmt::Debug {
    /// Whether the process has root privileges.
    fn is_root(&self) -> bool;

    /// Name of the user owning the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the process UID has no passwd entry.
    fn process_user(&self) -> Result<String>;

    /// Whether `username` is the account the process runs as.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::UnknownUser`] if the account does not exist.
    fn username_matches_uid(&self, username: &str) -> Result<bool>;

    /// Home directory of `username`.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::UnknownUser`] if the account does not exist.
    fn home_dir(&self, username: &str) -> Result<PathBuf>;
}

/// [`Identity`] backed by the passwd database.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemIdentity;

fn lookup(username: &str) -> Result<User> {
    User::from_name(username)
        .with_context(|| format!("looking up user {username}"))?
        .ok_or_else(|| FrontendError::UnknownUser(username.to_string()).into())
}

impl Identity for SystemIdentity {
    fn is_root(&self) -> bool {
        Uid::effective().is_root()
    }

    fn process_user(&self) -> Result<String> {
        let uid = Uid::current();
        let user = User::from_uid(uid)
            .with_context(|| format!("looking up uid {uid}"))?
            .ok_or_else(|| FrontendError::UnknownUser(uid.to_string()))?;
        Ok(user.name)
    }

    fn username_matches_uid(&self, username: &str) -> Result<bool> {
        Ok(lookup(username)?.uid == Uid::current())
    }

    fn home_dir(&self, username: &str) -> Result<PathBuf> {
        Ok(lookup(username)?.dir)
    }
}

/// SID used when the user cannot be resolved against a domain.
#[must_use]
pub fn local_sid(username: &str) -> String {
    format!("local-{username}")
}

/// Resolve the SID of `username`.
///
/// Without a domain the user is local.  With one, `wbinfo -n` is asked;
/// if that fails the local SID is used and a warning logged.
pub fn resolve_sid(
    executor: &dyn Executor,
    log: &dyn Log,
    domain: Option<&str>,
    username: &str,
) -> String {
    let Some(domain) = domain.filter(|d| !d.is_empty()) else {
        return local_sid(username);
    };

    let account = format!("{domain}\\{username}");
    let sid = executor
        .run("wbinfo", &["-n", &account])
        .ok()
        .and_then(|r| {
            r.stdout
                .split_whitespace()
                .next()
                .filter(|s| s.starts_with("S-"))
                .map(String::from)
        });

    sid.unwrap_or_else(|| {
        log.warn(&format!(
            "cannot resolve SID of {account}; using the local SID"
        ));
        local_sid(username)
    })
}
