//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use hiergraph_core::prelude::*;
//! ```

// Errors
pub use crate::error::{HierError, HierResult};

// Data model
pub use crate::model::{
    AnalysisResult, Direction, RelationKind, Relationship, TraversalOptions, TypeKind, TypeRecord,
};
pub use crate::universe::TypeUniverse;

// Engine
pub use crate::relations::build_relationships;
pub use crate::traverse::analyze;

// Rendering
pub use crate::diagram::{render_mermaid, DiagramOptions};
pub use crate::report::{render_report, OutputFormat, ReportContext};
pub use crate::tree::HierarchyTree;

// Configuration
pub use crate::config::{load_config, HierConfig};

// Builder API
pub use crate::builder::Hiergraph;
