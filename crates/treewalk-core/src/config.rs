//! Configuration tree and the TOML file that produces it.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the root configuration node.
pub const CHECKER_MODULE: &str = "Checker";
/// Name of the node whose children are tree checks.
pub const TREE_WALKER_MODULE: &str = "TreeWalker";

/// A node of the in-memory configuration tree.
///
/// Attributes and messages are ordered maps so two equal trees always
/// serialise, and therefore fingerprint, identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    name: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    messages: BTreeMap<String, String>,
    #[serde(default)]
    children: Vec<Configuration>,
}

impl Configuration {
    /// Creates a node with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Adds a custom message template.
    #[must_use]
    pub fn with_message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    /// Appends a child node.
    #[must_use]
    pub fn with_child(mut self, child: Configuration) -> Self {
        self.children.push(child);
        self
    }

    /// Sets an attribute in place.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Appends a child in place.
    pub fn add_child(&mut self, child: Configuration) {
        self.children.push(child);
    }

    /// Module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up one attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// All attributes in key order.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Custom message templates.
    #[must_use]
    pub fn messages(&self) -> &BTreeMap<String, String> {
        &self.messages
    }

    /// Child nodes in declaration order.
    #[must_use]
    pub fn children(&self) -> &[Configuration] {
        &self.children
    }

    /// First child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Configuration> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Top-level layout of `treewalk.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Run-level settings.
    #[serde(default)]
    pub checker: CheckerSection,

    /// Configured checks, in execution order.
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleSection>,

    /// Message translations keyed by locale, then by message key.
    #[serde(default)]
    pub translations: BTreeMap<String, BTreeMap<String, String>>,

    /// File-based suppressions, applied after the checks ran.
    #[serde(default, rename = "suppress", skip_serializing_if = "Vec::is_empty")]
    pub suppressions: Vec<SuppressSection>,
}

/// `[checker]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckerSection {
    /// Severity for modules that do not set one.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Lowest severity counted as a failure (default: error).
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Worker threads; `1` runs sequentially, unset uses all cores.
    #[serde(default)]
    pub threads: Option<usize>,

    /// Tab width for column expansion (default: 8).
    #[serde(default)]
    pub tab_width: Option<usize>,

    /// Message locale (default: en).
    #[serde(default)]
    pub locale: Option<String>,

    /// Path of the persistent cache; unset disables caching.
    #[serde(default)]
    pub cache_file: Option<PathBuf>,

    /// Directory event paths are reported relative to.
    #[serde(default)]
    pub basedir: Option<PathBuf>,

    /// Extensions to check; empty uses the language defaults.
    #[serde(default)]
    pub file_extensions: Vec<String>,

    /// Package prefixes tried when resolving module names.
    #[serde(default)]
    pub packages: Vec<String>,

    /// Glob patterns excluded from file discovery.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// One `[[module]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleSection {
    /// Module name, resolved through the registry.
    pub name: String,

    /// Optional id reported with violations.
    #[serde(default)]
    pub id: Option<String>,

    /// Severity override.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Token names overriding the default tokens.
    #[serde(default)]
    pub tokens: Vec<String>,

    /// Check-specific properties.
    #[serde(default)]
    pub properties: BTreeMap<String, toml::Value>,

    /// Custom message templates.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,

    /// Nested modules. Checks cannot have children, so any entry here is
    /// rejected when the checker is built.
    #[serde(default, rename = "module", skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<ModuleSection>,
}

/// One `[[suppress]]` entry.
///
/// A violation is dropped when every field that is set matches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressSection {
    /// Regex searched in the reported file path.
    #[serde(default)]
    pub files: Option<String>,

    /// Regex searched in the module name.
    #[serde(default)]
    pub checks: Option<String>,

    /// Regex searched in the rendered message.
    #[serde(default)]
    pub message: Option<String>,

    /// Module id, matched exactly.
    #[serde(default)]
    pub id: Option<String>,

    /// Lines such as `"10-20,30"`; unset covers the whole file.
    #[serde(default)]
    pub lines: Option<String>,
}

impl ModuleSection {
    fn to_configuration(&self) -> Configuration {
        let mut node = Configuration::new(&self.name);
        if let Some(id) = &self.id {
            node.set_attribute("id", id);
        }
        if let Some(severity) = self.severity {
            node.set_attribute("severity", severity.to_string());
        }
        if !self.tokens.is_empty() {
            node.set_attribute("tokens", self.tokens.join(","));
        }
        for (key, value) in &self.properties {
            node.set_attribute(key, property_string(value));
        }
        node.messages.clone_from(&self.messages);
        node.children = self.modules.iter().map(Self::to_configuration).collect();
        node
    }
}

fn property_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items
            .iter()
            .map(property_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

impl ConfigFile {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Builds the configuration tree: a `Checker` root carrying the
    /// result-affecting settings, with one `TreeWalker` child holding the
    /// modules.
    #[must_use]
    pub fn to_configuration(&self) -> Configuration {
        let section = &self.checker;
        let mut root = Configuration::new(CHECKER_MODULE);
        if let Some(severity) = section.severity {
            root.set_attribute("severity", severity.to_string());
        }
        if let Some(tab_width) = section.tab_width {
            root.set_attribute("tab_width", tab_width.to_string());
        }
        if let Some(locale) = &section.locale {
            root.set_attribute("locale", locale);
        }
        if !section.file_extensions.is_empty() {
            root.set_attribute("file_extensions", section.file_extensions.join(","));
        }
        if !section.packages.is_empty() {
            root.set_attribute("packages", section.packages.join(","));
        }

        let mut walker = Configuration::new(TREE_WALKER_MODULE);
        walker.children = self
            .modules
            .iter()
            .map(ModuleSection::to_configuration)
            .collect();
        root.add_child(walker);
        root
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A `[[suppress]]` entry is malformed.
    #[error("Invalid suppression #{index}: {message}")]
    Suppression {
        /// Zero-based position of the entry.
        index: usize,
        /// What is wrong with it.
        message: String,
    },
}
