//! Configuration loading from hiergraph.toml.

use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{HierError, HierResult, IoResultExt};
use crate::model::Direction;

/// Configuration file name looked up in the scanned root.
pub const CONFIG_FILE: &str = "hiergraph.toml";

/// Main configuration structure for hiergraph.toml.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HierConfig {
    /// Extra directory names to skip while scanning.
    pub exclude_dirs: Option<Vec<String>>,
    /// Traversal defaults.
    pub traversal: Option<TraversalConfig>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// `[traversal]` table.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TraversalConfig {
    pub max_depth: Option<usize>,
    pub direction: Option<Direction>,
    pub include_interfaces: Option<bool>,
    /// Replaces the built-in exclusion list.
    pub excluded_types: Option<Vec<String>>,
}

/// `[output]` table.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output format: markdown, tree, mermaid, dot, json or html.
    pub format: Option<String>,
    /// Emit diagram styling directives.
    pub styled: Option<bool>,
    /// Base classes marking a framework component.
    pub framework_bases: Option<Vec<String>>,
}

impl HierConfig {
    pub fn traversal(&self) -> TraversalConfig {
        self.traversal.clone().unwrap_or_default()
    }

    pub fn output(&self) -> OutputConfig {
        self.output.clone().unwrap_or_default()
    }

    pub fn exclude_dirs(&self) -> &[String] {
        self.exclude_dirs.as_deref().unwrap_or(&[])
    }
}

/// Loads configuration from `<root>/hiergraph.toml` if it exists.
///
/// A `root` that is a file looks next to it.
pub fn load_config(root: &Path) -> HierResult<Option<HierConfig>> {
    let dir = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).with_path(&path)?;
    parse_config(&path, &content).map(Some)
}

/// Parse configuration text; `path` is only used in error messages.
pub fn parse_config(path: &Path, content: &str) -> HierResult<HierConfig> {
    toml::from_str(content).map_err(|e| HierError::config(path, e.message().to_string()))
}
