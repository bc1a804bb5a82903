//! Browser enterprise policy files.
//!
//! Firefox reads a nested `{"policies": {...}}` document from its
//! distribution directory; Chromium reads a flat object from its managed
//! policy directory.
use anyhow::{Context as _, Result};
use serde_json::{Map, Value};

use super::{ApplierResult, Context, MachineApplier, check_enabled, process_resources};
use crate::resources::file::ManagedFile;
use crate::store::PolicyEntry;

/// Registry branch holding Firefox policies.
pub const FIREFOX_BRANCH: &str = "Software\\Policies\\Mozilla\\Firefox";

/// Registry branch holding Chromium policies.
pub const CHROMIUM_BRANCH: &str = "Software\\Policies\\Google\\Chrome";

const POLICIES_FILE: &str = "policies.json";

fn integer(data: &str) -> Option<Value> {
    data.trim().parse::<i64>().ok().map(Value::from)
}

fn firefox_value(data: &str) -> Value {
    match data.trim() {
        "0" => Value::Bool(false),
        "1" => Value::Bool(true),
        _ => integer(data).unwrap_or_else(|| Value::String(data.to_string())),
    }
}

fn chromium_value(data: &str) -> Value {
    integer(data).unwrap_or_else(|| Value::String(data.to_string()))
}

/// Insert `value` at the key path `parts`, creating intermediate objects.
///
/// A scalar already sitting where an object is needed is replaced.
fn insert_nested(root: &mut Map<String, Value>, parts: &[&str], value: Value) {
    let Some((last, parents)) = parts.split_last() else {
        return;
    };
    let mut node = root;
    for part in parents {
        let slot = node
            .entry((*part).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        node = next;
    }
    node.insert((*last).to_string(), value);
}

/// Build the Firefox policy tree from entries below [`FIREFOX_BRANCH`].
#[must_use]
pub fn firefox_policies(entries: &[PolicyEntry]) -> Value {
    let mut policies = Map::new();
    for entry in entries {
        let parts = entry.parts_below(FIREFOX_BRANCH);
        insert_nested(&mut policies, &parts, firefox_value(&entry.data));
    }
    let mut root = Map::new();
    root.insert("policies".to_string(), Value::Object(policies));
    Value::Object(root)
}

/// Build the flat Chromium policy object from entries below [`CHROMIUM_BRANCH`].
#[must_use]
pub fn chromium_policies(entries: &[PolicyEntry]) -> Value {
    Value::Object(
        entries
            .iter()
            .map(|e| (e.value_name().to_string(), chromium_value(&e.data)))
            .collect(),
    )
}

fn render(doc: &Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(doc).context("serialize browser policies")?;
    text.push('\n');
    Ok(text)
}

/// Writes Firefox `policies.json`.
#[derive(Debug)]
pub struct FirefoxApplier {
    enabled: bool,
}

impl FirefoxApplier {
    /// Module name.
    pub const NAME: &'static str = "FirefoxApplier";

    /// Create the applier.
    #[must_use]
    pub fn new(ctx: &Context) -> Self {
        Self {
            enabled: check_enabled(ctx.store.as_ref(), Self::NAME, false),
        }
    }
}

impl MachineApplier for FirefoxApplier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, ctx: &Context) -> Result<ApplierResult> {
        if !self.enabled {
            return Ok(ApplierResult::Disabled);
        }
        let entries = ctx.store.filter_hklm_entries(FIREFOX_BRANCH);
        if entries.is_empty() {
            return Ok(ApplierResult::Skipped("no Firefox policies".to_string()));
        }
        let content = render(&firefox_policies(&entries))?;
        let files = ctx
            .settings
            .firefox_policy_dirs
            .iter()
            .map(|dir| ManagedFile::new(dir.join(POLICIES_FILE), content.clone()));
        Ok(process_resources(ctx, files, "write", true)?.finish(ctx))
    }
}

/// Writes Chromium managed `policies.json`.
#[derive(Debug)]
pub struct ChromiumApplier {
    enabled: bool,
}

impl ChromiumApplier {
    /// Module name.
    pub const NAME: &'static str = "ChromiumApplier";

    /// Create the applier.
    #[must_use]
    pub fn new(ctx: &Context) -> Self {
        Self {
            enabled: check_enabled(ctx.store.as_ref(), Self::NAME, false),
        }
    }
}

impl MachineApplier for ChromiumApplier {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn apply(&self, ctx: &Context) -> Result<ApplierResult> {
        if !self.enabled {
            return Ok(ApplierResult::Disabled);
        }
        let entries = ctx.store.filter_hklm_entries(CHROMIUM_BRANCH);
        if entries.is_empty() {
            return Ok(ApplierResult::Skipped("no Chromium policies".to_string()));
        }
        let file = ManagedFile::new(
            ctx.settings.chromium_policy_dir.join(POLICIES_FILE),
            render(&chromium_policies(&entries))?,
        );
        Ok(process_resources(ctx, [file], "write", true)?.finish(ctx))
    }
}
