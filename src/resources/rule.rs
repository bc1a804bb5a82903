//! Templated PolicyKit rule generation.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::file::ManagedFile;

/// A named rule template with its default variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleTemplate {
    /// Template identifier, also the stem of the generated file name.
    pub id: &'static str,
    /// Variables bound when the store has nothing better.
    pub defaults: &'static [(&'static str, &'static str)],
    /// Template text used when no override exists in the template directory.
    pub builtin: &'static str,
}

/// Machine-wide removable storage rule.
pub const DISK_PERMISSIONS: RuleTemplate = RuleTemplate {
    id: "49-gpoa_disk_permissions",
    defaults: &[("Deny_All", "0")],
    builtin: include_str!("../../templates/49-gpoa_disk_permissions.rules.j2"),
};

/// Per-user removable storage rule.
pub const DISK_PERMISSIONS_USER: RuleTemplate = RuleTemplate {
    id: "48-gpoa_disk_permissions_user",
    defaults: &[("Deny_All", "0"), ("User", "")],
    builtin: include_str!("../../templates/48-gpoa_disk_permissions_user.rules.j2"),
};

/// A template together with the values bound to its variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTemplateBinding {
    template: RuleTemplate,
    /// Bound variables, starting from the template defaults.
    pub variables: BTreeMap<String, String>,
    /// Owner of a per-user rule; selects the `<id>.<user>.rules` file name.
    pub user: Option<String>,
}

impl RuleTemplateBinding {
    /// Bind `template` with its defaults.
    #[must_use]
    pub fn new(template: RuleTemplate) -> Self {
        Self {
            template,
            variables: template
                .defaults
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            user: None,
        }
    }

    /// Generate a per-user rule file for `user`.
    #[must_use]
    pub fn for_user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }

    /// Overwrite one variable.
    pub fn set(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
    }

    /// The template identifier.
    #[must_use]
    pub const fn template_id(&self) -> &'static str {
        self.template.id
    }

    /// Where the generated rule goes inside `rules_dir`.
    #[must_use]
    pub fn output_path(&self, rules_dir: &Path) -> PathBuf {
        let name = self.user.as_ref().map_or_else(
            || format!("{}.rules", self.template.id),
            |user| format!("{}.{user}.rules", self.template.id),
        );
        rules_dir.join(name)
    }

    /// Substitute `{{ Name }}` placeholders in `text`.
    ///
    /// Unbound placeholders are left as they are.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("{{") {
            let (before, tail) = rest.split_at(start);
            out.push_str(before);
            let Some(end) = tail.find("}}") else {
                rest = tail;
                break;
            };
            let name = tail.get(2..end).unwrap_or_default().trim();
            match self.variables.get(name) {
                Some(value) => out.push_str(value),
                None => out.push_str(tail.get(..end + 2).unwrap_or_default()),
            }
            rest = tail.get(end + 2..).unwrap_or_default();
        }
        out.push_str(rest);
        out
    }

    /// Load the template text: `<template_dir>/<id>.rules.j2` if present,
    /// otherwise the built-in one.
    ///
    /// # Errors
    ///
    /// Returns an error if an override exists but cannot be read.
    pub fn template_text(&self, template_dir: &Path) -> Result<String> {
        let path = template_dir.join(format!("{}.rules.j2", self.template.id));
        if path.is_file() {
            return std::fs::read_to_string(&path)
                .with_context(|| format!("read template {}", path.display()));
        }
        Ok(self.template.builtin.to_string())
    }

    /// The rendered rule as a file resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be loaded.
    pub fn generate(&self, template_dir: &Path, rules_dir: &Path) -> Result<ManagedFile> {
        let text = self.template_text(template_dir)?;
        Ok(ManagedFile::new(
            self.output_path(rules_dir),
            self.render(&text),
        ))
    }
}
