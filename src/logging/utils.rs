//! Log file location and timestamp helpers.
use std::fs;
use std::path::PathBuf;

/// Return the `$XDG_CACHE_HOME/gpoa/` directory, creating it if needed.
///
/// Falls back to `$HOME/.cache`, and to `/var/cache` when neither is set
/// (early boot runs as root without a login environment).
pub(super) fn gpoa_cache_dir() -> Option<PathBuf> {
    let cache_dir = std::env::var("XDG_CACHE_HOME").map_or_else(
        |_| {
            std::env::var("HOME").map_or_else(
                |_| PathBuf::from("/var/cache"),
                |home| PathBuf::from(home).join(".cache"),
            )
        },
        PathBuf::from,
    );
    let dir = cache_dir.join("gpoa");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Return the log file path for `command` under the gpoa cache directory.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    Some(gpoa_cache_dir()?.join(format!("{command}.log")))
}

/// Format the current UTC time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format the current UTC time as `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}
