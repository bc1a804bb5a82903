//! Command: print version information.

/// The build's version string.
#[must_use]
pub fn version() -> &'static str {
    option_env!("GPOA_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the gpoa version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("gpoa {}", version());
}
