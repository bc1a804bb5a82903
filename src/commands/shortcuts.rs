//! Command: dump a GPO shortcuts file.
use anyhow::{Context as _, Result};

use crate::cli::ShortcutsOpts;
use crate::logging::Logger;
use crate::policy::shortcut::read_shortcuts;

/// Print every shortcut of a GPO `Shortcuts.xml`, one JSON object per line.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid shortcuts
/// document.
#[allow(clippy::print_stdout)]
pub fn run(opts: &ShortcutsOpts, log: &Logger) -> Result<()> {
    let xml = std::fs::read_to_string(&opts.file)
        .with_context(|| format!("reading {}", opts.file.display()))?;
    let shortcuts = read_shortcuts(&xml, &opts.file.display().to_string())?;
    log.debug(&format!(
        "{} shortcut(s) in {}",
        shortcuts.len(),
        opts.file.display()
    ));
    for shortcut in &shortcuts {
        println!("{shortcut}");
    }
    Ok(())
}
