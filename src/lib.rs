//! Group policy applier.
//!
//! Reads policy fetched from a domain controller out of a local cache and
//! turns it into Linux system state: directories, desktop shortcuts,
//! PolicyKit rules, systemd units, `control` facilities and browser
//! policy files.
//!
//! The public API is organised into layers:
//!
//! - **[`store`]** and **[`policy`]**: read cached registry values and build policy objects
//! - **[`resources`]**: idempotent `check + apply` primitives (files, folders, units, …)
//! - **[`appliers`]**: one per policy family, wired to resources
//! - **[`frontend`]**: picks the user and runs the appliers in order
//! - **[`commands`]**: top-level subcommand orchestration (`apply`, `shortcuts`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod appliers;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod frontend;
pub mod identity;
pub mod logging;
pub mod operations;
pub mod policy;
pub mod resources;
pub mod store;
