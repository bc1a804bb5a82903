//! Shortcut policies: GPO XML and JSON forms, and their desktop-entry rendering.
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

use super::windows::{expand_windows_var, str2bool, transform_windows_path};
use crate::error::PolicyError;
use crate::resources::file::ManagedFile;
use crate::resources::{Applicable, ResourceChange};

/// One shortcut policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShortcutPolicy {
    /// Where the `.desktop` file goes (Windows-style, may contain `%VAR%`).
    pub dest: String,
    /// Executable the shortcut launches.
    pub path: String,
    /// Command-line arguments appended to `path`.
    pub arguments: String,
    /// Display name.
    pub name: String,
    /// GPO change timestamp, as found in the policy.
    pub changed: String,
    /// GPO preference class id.
    pub clsid: String,
    /// GPO preference item id.
    pub guid: String,
    /// Whether the shortcut is created in the user's own context.
    pub is_in_user_context: bool,
}

/// Keys every serialized shortcut must carry.
const REQUIRED_KEYS: [&str; 8] = [
    "dest",
    "path",
    "arguments",
    "name",
    "changed",
    "clsid",
    "guid",
    "is_in_user_context",
];

impl ShortcutPolicy {
    /// Build a shortcut from its JSON serialization.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidJson`] if the text is not a JSON object
    /// and [`PolicyError::MissingKey`] if any required key is absent.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| PolicyError::InvalidJson(e.to_string()))?;
        let obj = value
            .as_object()
            .ok_or_else(|| PolicyError::InvalidJson("expected a JSON object".to_string()))?;

        if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !obj.contains_key(**k)) {
            return Err(PolicyError::MissingKey((*missing).to_string()).into());
        }

        Ok(Self {
            dest: json_string(obj, "dest"),
            path: json_string(obj, "path"),
            arguments: json_string(obj, "arguments"),
            name: json_string(obj, "name"),
            changed: json_string(obj, "changed"),
            clsid: json_string(obj, "clsid"),
            guid: json_string(obj, "guid"),
            is_in_user_context: json_flag(obj.get("is_in_user_context")),
        })
    }

    /// The desktop entry describing this shortcut.
    #[must_use]
    pub fn desktop(&self) -> DesktopEntry {
        let exec = format!("{} {}", self.path, self.arguments);
        DesktopEntry::new()
            .with("Type", "Application")
            .with("Version", "1.0")
            .with("Terminal", "false")
            .with("Exec", exec.trim_end())
            .with("Name", &self.name)
    }

    /// The desktop-entry keys overlaid with the shortcut's own fields.
    ///
    /// Shortcut fields win on key collisions.
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        let mut content: Map<String, Value> = self
            .desktop()
            .entries()
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        let fields = [
            ("dest", &self.dest),
            ("path", &self.path),
            ("name", &self.name),
            ("arguments", &self.arguments),
            ("clsid", &self.clsid),
            ("guid", &self.guid),
            ("changed", &self.changed),
        ];
        for (key, value) in fields {
            content.insert(key.to_string(), Value::String(value.clone()));
        }
        content.insert(
            "is_in_user_context".to_string(),
            Value::from(u8::from(self.is_in_user_context)),
        );

        Value::Object(content)
    }

    /// Serialize to a JSON string (see [`to_json_value`](Self::to_json_value)).
    #[must_use]
    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }

    /// Linux location of the `.desktop` file, with `%VAR%` tokens expanded
    /// for `home` (or the machine defaults).
    #[must_use]
    pub fn desktop_path(&self, home: Option<&Path>) -> PathBuf {
        let dest = transform_windows_path(&expand_windows_var(&self.dest, home));
        PathBuf::from(format!("{dest}.desktop"))
    }

    /// The desktop file for this shortcut at `path`, as a managed resource.
    #[must_use]
    pub fn desktop_file(&self, path: &Path) -> ManagedFile {
        ManagedFile::new(path, self.desktop().render())
    }

    /// Write the `.desktop` file to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn write_desktop(&self, path: &Path) -> Result<ResourceChange> {
        self.desktop_file(path).apply()
    }
}

impl fmt::Display for ShortcutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

fn json_string(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn json_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => str2bool(s),
        _ => false,
    }
}

/// A `[Desktop Entry]` group with its keys in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DesktopEntry {
    entries: Vec<(String, String)>,
}

impl DesktopEntry {
    /// An empty entry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set `key`, replacing an earlier value.
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value.to_string();
        } else {
            self.entries.push((key.to_string(), value.to_string()));
        }
        self
    }

    /// Look up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All keys in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Render in freedesktop `.desktop` file format.
    ///
    /// Values are escaped so each key stays on one line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("[Desktop Entry]\n");
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(&escape_value(value));
            out.push('\n');
        }
        out
    }
}

/// Escape a desktop-entry value (`\\`, `\n`, `\t`, `\r`).
fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Attributes collected for one `<link>` element while reading XML.
#[derive(Debug, Default)]
struct PendingLink {
    name: String,
    changed: String,
    clsid: String,
    uid: String,
    user_context: String,
    properties: Option<(String, String, String)>,
}

fn attributes(element: &BytesStart<'_>) -> Result<Vec<(String, String)>, quick_xml::Error> {
    element
        .attributes()
        .map(|attr| {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value()?.to_string();
            Ok((key, value))
        })
        .collect()
}

fn lookup(attrs: &[(String, String)], key: &str) -> String {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
        .unwrap_or_default()
}

/// Read every shortcut from the text of a GPO `Shortcuts.xml`.
///
/// Each child of the document root is one link; its `Properties` child
/// carries the target.  `source` names the document in error messages.
///
/// # Errors
///
/// Returns [`PolicyError::InvalidXml`] if the document is malformed or a
/// link has no `Properties` element.
pub fn read_shortcuts(xml: &str, source: &str) -> Result<Vec<ShortcutPolicy>> {
    let invalid = |message: String| PolicyError::InvalidXml {
        file: source.to_string(),
        message,
    };

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut links: Vec<PendingLink> = Vec::new();
    let mut depth = 0usize;

    loop {
        let (element, level) = match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                (e, depth)
            }
            Ok(Event::Empty(e)) => (e, depth + 1),
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                continue;
            }
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(e) => return Err(invalid(e.to_string()).into()),
        };

        let attrs = attributes(&element).map_err(|e| invalid(e.to_string()))?;
        match level {
            2 => links.push(PendingLink {
                name: lookup(&attrs, "name"),
                changed: lookup(&attrs, "changed"),
                clsid: lookup(&attrs, "clsid"),
                uid: lookup(&attrs, "uid"),
                user_context: lookup(&attrs, "userContext"),
                properties: None,
            }),
            3 if element.local_name().as_ref() == b"Properties" => {
                if let Some(link) = links.last_mut() {
                    link.properties = Some((
                        lookup(&attrs, "shortcutPath"),
                        lookup(&attrs, "targetPath"),
                        lookup(&attrs, "arguments"),
                    ));
                }
            }
            _ => {}
        }
    }

    links
        .into_iter()
        .map(|link| {
            let (dest, target, arguments) = link.properties.ok_or_else(|| {
                invalid(format!("link '{}' has no Properties element", link.name))
            })?;
            Ok(ShortcutPolicy {
                dest,
                path: transform_windows_path(&target),
                arguments,
                name: link.name,
                changed: link.changed,
                clsid: link.clsid,
                guid: link.uid,
                is_in_user_context: str2bool(&link.user_context),
            })
        })
        .collect()
}
