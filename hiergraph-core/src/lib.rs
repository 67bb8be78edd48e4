//! hiergraph-core: inheritance-graph engine for C# code bases.
//!
//! Extracts type declarations from C# sources, resolves their declared base
//! types and interfaces into a relationship graph, walks that graph outward
//! from a target type and renders the result as a text tree and a diagram.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hiergraph_core::prelude::*;
//!
//! let result = Hiergraph::new("/path/to/project")
//!     .direction(Direction::Both)
//!     .analyze("PlayerController")?;
//!
//! let tree = HierarchyTree::new(&result, &["MonoBehaviour"]);
//! print!("{}", tree.render_text()?);
//! ```
//!
//! # Module Organization
//!
//! - [`model`]: type records, relationships, traversal options and results
//! - [`universe`]: the known type set and three-tier name resolution
//! - [`relations`]: declared names → resolved edges
//! - [`traverse`]: depth-bounded ancestor/descendant walks
//! - [`graph`]: petgraph view of a result (children, reachability)
//! - [`tree`]: ancestor chain, descendant tree, statistics
//! - [`diagram`]: Mermaid flowchart
//! - [`extract`]: tree-sitter C# extraction
//! - [`scan`]: parallel source discovery
//! - [`report`]: document assembly in every output format
//! - [`builder`]: fluent API tying it together
//!
//! # Cargo Features
//!
//! - `html` (default): standalone HTML report
//! - `dot` (default): Graphviz DOT output
//! - `full`: everything

// Core modules (always available)
pub mod builder;
pub mod config;
pub mod diagram;
pub mod error;
pub mod extract;
pub mod graph;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod relations;
pub mod report;
pub mod scan;
pub mod traverse;
pub mod tree;
pub mod universe;

// Feature-gated modules
#[cfg(feature = "dot")]
pub mod visualize;

#[cfg(feature = "html")]
pub mod report_html;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{HierError, HierResult, IoResultExt};

// Builder API
pub use builder::Hiergraph;

// Configuration
pub use config::{load_config, parse_config, HierConfig, OutputConfig, TraversalConfig, CONFIG_FILE};

// Data model
pub use model::{
    qualify, AnalysisResult, Direction, MemberKind, MemberSummary, RelationKind, Relationship,
    TraversalOptions, TypeKind, TypeRecord, DEFAULT_EXCLUDED_TYPES, DEFAULT_FRAMEWORK_BASES,
};
pub use universe::{type_matches, Resolver, TypeUniverse};

// Engine
pub use relations::{build_relationships, build_with_resolver, count_kind};
pub use traverse::{analyze, MAX_EXPANSIONS};

// Graph view
pub use graph::{build_graph, descendant_count, RelationGraph};

// Extraction
pub use extract::{
    extract_file, extract_types, extract_types_strict, load_types_json, parse_sources,
    CSharpExtractor, ParseOutcome,
};

// File scanning
pub use scan::{gather_cs_files, gather_cs_files_with_excludes, EXCLUDED_DIRS};

// Logging
pub use logging::{init_logging, LogFormat};

// Rendering
pub use diagram::{classify, partition, render_mermaid, sanitize_id, DiagramOptions, NodeClass, Partition};
pub use report::{render_json, render_markdown, render_not_found, render_report, OutputFormat, ReportContext};
pub use tree::{type_icon, HierarchyTree, TreeStats, TREE_RENDER_DEPTH};

// Feature-gated re-exports
#[cfg(feature = "dot")]
pub use visualize::generate_dot;

#[cfg(feature = "html")]
pub use report_html::render_html_page;
