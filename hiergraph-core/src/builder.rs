//! Builder pattern API for hierarchy analysis.
//!
//! Provides a fluent interface for scanning a source tree and running a
//! traversal:
//!
//! ```rust,ignore
//! use hiergraph_core::prelude::*;
//!
//! let result = Hiergraph::new("/path/to/unity/project")
//!     .direction(Direction::Down)
//!     .max_depth(5)
//!     .analyze("BaseController")?;
//!
//! for t in &result.types {
//!     println!("{}", t.full_name);
//! }
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::HierConfig;
use crate::error::HierResult;
use crate::extract::{load_types_json, parse_sources};
use crate::model::{AnalysisResult, Direction, TraversalOptions, TypeRecord};
use crate::scan::gather_cs_files_with_excludes;
use crate::traverse::analyze;
use crate::universe::TypeUniverse;

/// Where type records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    /// Scan a directory (or single file) of C# sources
    Sources(PathBuf),
    /// Read a JSON array of records
    TypesJson(PathBuf),
}

/// Builder for configuring an analysis run.
#[derive(Debug, Clone)]
pub struct Hiergraph {
    source: Source,

    /// Extra directory names skipped while scanning
    excluded_dirs: Vec<String>,

    /// Drop files containing syntax errors instead of keeping partial types
    strict: bool,

    direction: Direction,
    max_depth: usize,
    include_interfaces: bool,
    excluded_types: BTreeSet<String>,
}

impl Hiergraph {
    /// Analyze the C# sources under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Sources(root.into()),
            excluded_dirs: Vec::new(),
            strict: true,
            direction: Direction::Both,
            max_depth: TraversalOptions::DEFAULT_DEPTH,
            include_interfaces: true,
            excluded_types: TraversalOptions::default_excluded_types(),
        }
    }

    /// Analyze records previously exported as JSON instead of scanning.
    pub fn from_types_json(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::TypesJson(path.into()),
            ..Self::new(PathBuf::new())
        }
    }

    /// Apply settings from a configuration file. Call before the individual
    /// setters so explicit values win.
    pub fn with_config(mut self, cfg: &HierConfig) -> Self {
        self.excluded_dirs.extend(cfg.exclude_dirs().iter().cloned());

        let traversal = cfg.traversal();
        if let Some(depth) = traversal.max_depth {
            self.max_depth = depth;
        }
        if let Some(direction) = traversal.direction {
            self.direction = direction;
        }
        if let Some(include) = traversal.include_interfaces {
            self.include_interfaces = include;
        }
        if let Some(types) = traversal.excluded_types {
            self.excluded_types = types.into_iter().collect();
        }
        self
    }

    /// Add directory names to skip while scanning.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Keep partially parsed types from files with syntax errors.
    pub fn lenient(mut self, enabled: bool) -> Self {
        self.strict = !enabled;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn include_interfaces(mut self, enabled: bool) -> Self {
        self.include_interfaces = enabled;
        self
    }

    /// Add names to the exclusion list.
    pub fn exclude_types(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_types.extend(names.into_iter().map(Into::into));
        self
    }

    /// Drop the built-in framework root exclusions.
    pub fn keep_framework_types(mut self) -> Self {
        let defaults = TraversalOptions::default_excluded_types();
        self.excluded_types.retain(|name| !defaults.contains(name));
        self
    }

    /// Path being scanned, or the JSON file being read.
    pub fn source_path(&self) -> &Path {
        match &self.source {
            Source::Sources(p) | Source::TypesJson(p) => p,
        }
    }

    /// Traversal options for `target` with the current settings.
    pub fn traversal_options(&self, target: impl Into<String>) -> TraversalOptions {
        TraversalOptions::new(target)
            .direction(self.direction)
            .max_depth(self.max_depth)
            .include_interfaces(self.include_interfaces)
            .excluded_types(self.excluded_types.iter().cloned())
    }

    /// Extract (or load) every record.
    pub fn load_types(&self) -> HierResult<Vec<TypeRecord>> {
        match &self.source {
            Source::Sources(root) => {
                let files = gather_cs_files_with_excludes(root, self.excluded_dirs.as_slice())?;
                info!(root = %root.display(), files = files.len(), "scanning sources");
                parse_sources(&files, self.strict)
            }
            Source::TypesJson(path) => {
                debug!(path = %path.display(), "loading type records");
                load_types_json(path)
            }
        }
    }

    /// Build the type universe.
    pub fn load_universe(&self) -> HierResult<TypeUniverse> {
        let universe = TypeUniverse::from_records(self.load_types()?);
        info!(types = universe.len(), "type universe ready");
        Ok(universe)
    }

    /// Load the universe and analyze `target`.
    pub fn analyze(&self, target: &str) -> HierResult<AnalysisResult> {
        let universe = self.load_universe()?;
        analyze(&universe, &self.traversal_options(target))
    }
}
