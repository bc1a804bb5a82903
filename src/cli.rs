//! Command-line interface.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::frontend::Target;

/// Top-level CLI entry point for the group policy applier.
#[derive(Parser, Debug)]
#[command(
    name = "gpoa",
    about = "Apply cached group policy to this machine and its users",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Settings file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Override the policy store location from the settings file
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply machine and/or user policy
    Apply(ApplyOpts),
    /// Print the shortcuts of a GPO Shortcuts.xml as JSON
    Shortcuts(ShortcutsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Apply(_) => "apply",
            Self::Shortcuts(_) => "shortcuts",
            Self::Version => "version",
        }
    }
}

/// Options for the `apply` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ApplyOpts {
    /// User to apply policy for (defaults to the process owner)
    pub username: Option<String>,

    /// Which part of the policy to apply
    #[arg(long, value_enum, default_value_t = Target::All)]
    pub target: Target,
}

/// Options for the `shortcuts` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ShortcutsOpts {
    /// Path to a Shortcuts.xml file
    pub file: PathBuf,
}
