//! Report assembly: wraps renderer output into a presentable document.
//!
//! Formats:
//! - `markdown`: ancestor chain, target details, descendant tree, Mermaid
//!   diagram and statistics
//! - `tree`: plain-text chain, tree and statistics
//! - `mermaid` / `dot`: the bare diagram
//! - `json`: the analysis result plus statistics
//! - `html`: a standalone page rendering the diagram in the browser

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{self, Write};
use std::str::FromStr;

use crate::diagram::{render_mermaid, DiagramOptions};
use crate::error::{HierError, HierResult};
use crate::model::{AnalysisResult, Relationship, TraversalOptions, TypeRecord};
use crate::tree::{HierarchyTree, TreeStats};

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Tree,
    Mermaid,
    Dot,
    Json,
    Html,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        Self::Markdown,
        Self::Tree,
        Self::Mermaid,
        Self::Dot,
        Self::Json,
        Self::Html,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Tree => "tree",
            Self::Mermaid => "mermaid",
            Self::Dot => "dot",
            Self::Json => "json",
            Self::Html => "html",
        }
    }

    /// Conventional file extension for `--output` suggestions.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Tree => "txt",
            Self::Mermaid => "mmd",
            Self::Dot => "dot",
            Self::Json => "json",
            Self::Html => "html",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = HierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "tree" | "text" => Ok(Self::Tree),
            "mermaid" => Ok(Self::Mermaid),
            "dot" => Ok(Self::Dot),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            other => Err(HierError::invalid_argument(format!(
                "unknown output format '{}', expected one of markdown, tree, mermaid, dot, json, html",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a report needs besides the result itself.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub diagram: DiagramOptions,
    pub generated_at: DateTime<Utc>,
}

impl Default for ReportContext {
    fn default() -> Self {
        Self {
            diagram: DiagramOptions::default(),
            generated_at: Utc::now(),
        }
    }
}

impl ReportContext {
    pub fn new(diagram: DiagramOptions) -> Self {
        Self {
            diagram,
            generated_at: Utc::now(),
        }
    }

    fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// JSON document shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    generated_at: String,
    query: &'a str,
    target_type: &'a str,
    options: &'a TraversalOptions,
    stats: TreeStats,
    types: &'a [TypeRecord],
    relationships: Vec<&'a Relationship>,
}

/// Render `result` in the requested format.
pub fn render_report(
    result: &AnalysisResult,
    format: OutputFormat,
    ctx: &ReportContext,
) -> HierResult<String> {
    match format {
        OutputFormat::Markdown => render_markdown(result, ctx),
        OutputFormat::Tree => {
            HierarchyTree::new(result, ctx.diagram.framework_bases.as_slice()).render_text()
        }
        OutputFormat::Mermaid => render_mermaid(result, &ctx.diagram),
        OutputFormat::Dot => render_dot(result, ctx),
        OutputFormat::Json => render_json(result, ctx),
        OutputFormat::Html => render_html(result, ctx),
    }
}

#[cfg(feature = "dot")]
fn render_dot(result: &AnalysisResult, ctx: &ReportContext) -> HierResult<String> {
    crate::visualize::generate_dot(result, &ctx.diagram)
}

#[cfg(not(feature = "dot"))]
fn render_dot(_result: &AnalysisResult, _ctx: &ReportContext) -> HierResult<String> {
    Err(HierError::invalid_argument("dot output requires the `dot` feature"))
}

/// Serialize the result, statistics and options as pretty JSON.
pub fn render_json(result: &AnalysisResult, ctx: &ReportContext) -> HierResult<String> {
    let tree = HierarchyTree::new(result, ctx.diagram.framework_bases.as_slice());
    let report = JsonReport {
        generated_at: ctx.generated_at.to_rfc3339(),
        query: &result.query,
        target_type: &result.target_type,
        options: &result.options,
        stats: tree.stats(),
        types: &result.types,
        relationships: result.sorted_relationships(),
    };
    let mut json = serde_json::to_string_pretty(&report)
        .map_err(|e| HierError::render(format!("JSON serialization failed: {}", e)))?;
    json.push('\n');
    Ok(json)
}

/// Markdown document combining every textual rendering.
pub fn render_markdown(result: &AnalysisResult, ctx: &ReportContext) -> HierResult<String> {
    let tree = HierarchyTree::new(result, ctx.diagram.framework_bases.as_slice());
    let mut out = String::with_capacity(128 * (result.types.len() + 16));

    writeln!(out, "# 📊 {} inheritance analysis", result.query)?;
    writeln!(out)?;
    writeln!(out, "_Generated {} by hiergraph_", ctx.timestamp())?;
    writeln!(out)?;

    let chain = tree.ancestor_lines();
    if chain.len() > 1 {
        writeln!(out, "## 📈 Ancestor chain")?;
        writeln!(out)?;
        writeln!(out, "```text")?;
        for line in &chain {
            writeln!(out, "{}", line)?;
        }
        writeln!(out, "```")?;
        writeln!(out)?;
    }

    if let Some(target) = tree.target() {
        write_target_details(&mut out, &tree, target)?;
    }

    if tree.has_children() {
        writeln!(out, "## 📊 Inheritance tree")?;
        writeln!(out)?;
        writeln!(out, "```text")?;
        for line in tree.descendant_lines() {
            writeln!(out, "{}", line)?;
        }
        writeln!(out, "```")?;
    } else {
        writeln!(out, "## 📊 Subtypes")?;
        writeln!(out)?;
        writeln!(out, "No subtypes or implementors.")?;
    }
    writeln!(out)?;

    writeln!(out, "## 🗺️ Diagram")?;
    writeln!(out)?;
    writeln!(out, "```mermaid")?;
    out.push_str(&render_mermaid(result, &ctx.diagram)?);
    writeln!(out, "```")?;
    writeln!(out)?;

    write_stats(&mut out, &tree.stats())?;
    Ok(out)
}

fn write_target_details(out: &mut String, tree: &HierarchyTree<'_>, target: &TypeRecord) -> fmt::Result {
    writeln!(out, "## 🎯 Target details")?;
    writeln!(out)?;
    writeln!(out, "**{}**", tree.label(target))?;
    writeln!(out)?;
    writeln!(out, "- **Full name**: `{}`", target.full_name)?;
    writeln!(out, "- **Kind**: {}", target.kind)?;
    if target.namespace.is_empty() {
        writeln!(out, "- **Namespace**: (global)")?;
    } else {
        writeln!(out, "- **Namespace**: {}", target.namespace)?;
    }
    if !target.modifiers.is_empty() {
        writeln!(out, "- **Modifiers**: {}", target.modifiers.join(", "))?;
    }
    writeln!(out, "- **Members**: {}", target.members.len())?;
    if let Some(source) = &target.source {
        writeln!(out, "- **Source**: `{}`", source.display())?;
    }
    writeln!(out)
}

fn write_stats(out: &mut String, stats: &TreeStats) -> fmt::Result {
    writeln!(out, "## 📈 Statistics")?;
    writeln!(out)?;
    writeln!(out, "- **Related types**: {}", stats.total_types)?;
    writeln!(out, "- **Relationships**: {}", stats.total_relationships)?;
    writeln!(out, "- **Direct parents and interfaces**: {}", stats.direct_parents)?;
    writeln!(out, "- **Transitive descendants**: {}", stats.descendants)?;
    for kind in crate::model::TypeKind::ALL {
        let count = stats.kind_count(kind);
        if count > 0 {
            writeln!(out, "- **{}**: {}", capitalize(kind.plural()), count)?;
        }
    }
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Document for a query that matched no type. The JSON form keeps the
/// result keys with empty `types` and `relationships`.
pub fn render_not_found(query: &str, format: OutputFormat) -> HierResult<String> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "error": "no such type",
                "target": query,
                "query": query,
                "targetType": null,
                "types": [],
                "relationships": []
            });
            serde_json::to_string_pretty(&value)
                .map(|s| s + "\n")
                .map_err(|e| HierError::render(format!("JSON serialization failed: {}", e)))
        }
        OutputFormat::Markdown => Ok(format!(
            "# 📊 {} inheritance analysis\n\n❌ no such type: {}\n",
            query, query
        )),
        _ => Ok(format!("no such type: {}\n", query)),
    }
}

#[cfg(feature = "html")]
fn render_html(result: &AnalysisResult, ctx: &ReportContext) -> HierResult<String> {
    crate::report_html::render_html_page(result, ctx)
}

#[cfg(not(feature = "html"))]
fn render_html(_result: &AnalysisResult, _ctx: &ReportContext) -> HierResult<String> {
    Err(HierError::invalid_argument("html output requires the `html` feature"))
}
