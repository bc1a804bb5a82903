//! `gpoa` command-line entry point.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use gpoa::{cli, commands, logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.name();
    logging::init_subscriber(args.verbose, command);
    let log = Arc::new(logging::Logger::new(command));

    match args.command {
        cli::Command::Apply(opts) => commands::apply::run(&args.global, &opts, &log),
        cli::Command::Shortcuts(opts) => commands::shortcuts::run(&opts, &log),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
