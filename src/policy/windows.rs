//! Translation of Windows-flavoured policy values into Linux terms.
use std::path::Path;

/// Substitute `%VAR%` tokens in a GPO path with their Linux equivalents.
///
/// Without a user the machine-wide defaults are used (`%HOME%` is
/// `/etc/skel`, menus go to `/usr/share/applications`).  With a user and
/// their home directory, `%HOME%`, `%DesktopDir%` and `%StartMenuDir%`
/// point inside that home.  Unknown variables are left untouched.
#[must_use]
pub fn expand_windows_var(text: &str, home: Option<&Path>) -> String {
    let mut vars: Vec<(&str, String)> = vec![
        ("HOME", "/etc/skel".to_string()),
        ("SystemRoot", "/".to_string()),
        ("SystemDrive", "/".to_string()),
        ("StartMenuDir", "/usr/share/applications".to_string()),
    ];

    if let Some(home) = home {
        let home_str = home.display().to_string();
        vars = vec![
            ("HOME", home_str.clone()),
            ("HOMEPATH", home_str.clone()),
            ("USERPROFILE", home_str),
            ("SystemRoot", "/".to_string()),
            ("SystemDrive", "/".to_string()),
            ("DesktopDir", home.join("Desktop").display().to_string()),
            (
                "StartMenuDir",
                home.join(".local/share/applications").display().to_string(),
            ),
        ];
    }

    vars.iter().fold(text.to_string(), |acc, (name, value)| {
        acc.replace(&format!("%{name}%"), value)
    })
}

/// Convert a Windows path to its Linux form: drop the drive prefix and
/// turn backslashes into forward slashes.
///
/// # Examples
///
/// ```
/// use gpoa::policy::windows::transform_windows_path;
///
/// assert_eq!(transform_windows_path(r"C:\usr\bin\firefox"), "/usr/bin/firefox");
/// assert_eq!(transform_windows_path("/usr/bin/env"), "/usr/bin/env");
/// ```
#[must_use]
pub fn transform_windows_path(text: &str) -> String {
    let mut chars = text.chars();
    let stripped = match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() => chars.as_str(),
        _ => text,
    };
    stripped.replace('\\', "/")
}

/// Interpret a registry-style boolean (`true`, `yes`, `1`, any case).
#[must_use]
pub fn str2bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_machine_defaults_without_user() {
        assert_eq!(expand_windows_var("%HOME%/docs", None), "/etc/skel/docs");
        assert_eq!(
            expand_windows_var("%StartMenuDir%/app", None),
            "/usr/share/applications/app"
        );
    }

    #[test]
    fn expands_user_home_variables() {
        let home = Path::new("/home/alice");
        assert_eq!(
            expand_windows_var("%HOME%\\Documents", Some(home)),
            "/home/alice\\Documents"
        );
        assert_eq!(
            expand_windows_var("%DesktopDir%/Mail", Some(home)),
            "/home/alice/Desktop/Mail"
        );
        assert_eq!(
            expand_windows_var("%StartMenuDir%/x", Some(home)),
            "/home/alice/.local/share/applications/x"
        );
    }

    #[test]
    fn leaves_unknown_variables_alone() {
        assert_eq!(expand_windows_var("%APPDATA%/x", None), "%APPDATA%/x");
    }

    #[test]
    fn transform_strips_drive_and_flips_slashes() {
        assert_eq!(transform_windows_path(r"D:\Program Files\x.exe"), "/Program Files/x.exe");
        assert_eq!(transform_windows_path(r"relative\path"), "relative/path");
    }

    #[test]
    fn str2bool_accepts_common_truthy_values() {
        for v in ["true", "TRUE", "yes", "1", " Yes "] {
            assert!(str2bool(v), "{v:?} should be true");
        }
        for v in ["false", "0", "no", "", "2"] {
            assert!(!str2bool(v), "{v:?} should be false");
        }
    }
}
