//! Graphviz DOT visualization for type hierarchies.
//!
//! Uses the same partition as the Mermaid renderer: parents, interfaces and
//! children become `subgraph cluster_*` blocks around the target node.
//! Nodes are filled by visual class, implementation edges are dashed.

use std::fmt::Write;

use crate::diagram::{partition, DiagramOptions, NodeClass};
use crate::error::HierResult;
use crate::model::{AnalysisResult, RelationKind, TypeRecord};

const TARGET_FILL: &str = "#FFD54F";

/// Generate a Graphviz DOT representation of the analysis result.
///
/// - edges point from subtype to supertype, so `rankdir=BT` puts roots on top
/// - the target is bold and gold
/// - with `options.styled == false` every node uses the default fill
pub fn generate_dot(result: &AnalysisResult, options: &DiagramOptions) -> HierResult<String> {
    // ~80 bytes/node + ~60 bytes/edge + header/footer
    let estimated_capacity = result.types.len() * 80 + result.relationships.len() * 60 + 200;
    let mut dot = String::with_capacity(estimated_capacity);
    write_dot_content(&mut dot, result, options)?;
    Ok(dot)
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn write_node(
    dot: &mut String,
    indent: &str,
    rec: &TypeRecord,
    options: &DiagramOptions,
) -> std::fmt::Result {
    let class = if options.styled {
        options.classify(rec)
    } else {
        NodeClass::Default
    };
    let (fill, _) = class.colors();
    let shape = match class {
        NodeClass::Interface => "ellipse",
        _ => "box",
    };
    writeln!(
        dot,
        "{}{} [label={}, shape={}, fillcolor=\"{}\"];",
        indent,
        quote(&rec.full_name),
        quote(&rec.name),
        shape,
        fill
    )
}

fn write_cluster(
    dot: &mut String,
    id: &str,
    label: &str,
    members: &[&TypeRecord],
    options: &DiagramOptions,
) -> std::fmt::Result {
    if members.is_empty() {
        return Ok(());
    }
    writeln!(dot, "  subgraph cluster_{} {{", id)?;
    writeln!(dot, "    label={};", quote(label))?;
    writeln!(dot, "    style=rounded;")?;
    for rec in members {
        write_node(dot, "    ", rec, options)?;
    }
    writeln!(dot, "  }}")?;
    writeln!(dot)
}

fn write_dot_content(
    dot: &mut String,
    result: &AnalysisResult,
    options: &DiagramOptions,
) -> std::fmt::Result {
    writeln!(dot, "digraph hiergraph {{")?;
    writeln!(dot, "  rankdir=BT;")?;
    writeln!(
        dot,
        "  node [shape=box, style=filled, fontname=\"JetBrains Mono\"];"
    )?;
    writeln!(dot)?;

    let groups = partition(result);
    write_cluster(dot, "parents", "Parents", &groups.parents, options)?;
    write_cluster(dot, "interfaces", "Interfaces", &groups.interfaces, options)?;

    if let Some(target) = result.target() {
        writeln!(
            dot,
            "  {} [label={}, fillcolor=\"{}\", penwidth=2];",
            quote(&target.full_name),
            quote(&target.name),
            TARGET_FILL
        )?;
        writeln!(dot)?;
    }

    write_cluster(dot, "children", "Children", &groups.children, options)?;

    for rel in result.sorted_relationships() {
        match rel.kind {
            RelationKind::Inheritance => {
                writeln!(dot, "  {} -> {} [label=\"extends\"];", quote(&rel.from), quote(&rel.to))?
            }
            RelationKind::Implementation => writeln!(
                dot,
                "  {} -> {} [label=\"implements\", style=dashed];",
                quote(&rel.from),
                quote(&rel.to)
            )?,
        }
    }

    writeln!(dot, "}}")?;
    Ok(())
}
