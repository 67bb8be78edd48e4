//! Tree renderer: ancestor chain, descendant tree and statistics.
//!
//! Output is a pure function of the [`AnalysisResult`]: siblings are sorted
//! (implementation edges first, then simple name, then full name), so the
//! same result always renders to byte-identical text.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::error::HierResult;
use crate::graph::{build_graph, children, descendant_count, RelationGraph};
use crate::model::{AnalysisResult, RelationKind, TypeKind, TypeRecord};

/// Nodes at this depth or shallower have their children rendered.
pub const TREE_RENDER_DEPTH: usize = 5;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const SPACE_INDENT: &str = "    ";

/// Icon shown next to a type name.
pub fn type_icon<S: AsRef<str>>(rec: &TypeRecord, framework_bases: &[S]) -> &'static str {
    match rec.kind {
        TypeKind::Interface => "🔌",
        TypeKind::Struct => "🧱",
        _ if rec.derives_directly_from(framework_bases) => "🎮",
        _ if rec.is_abstract() => "📐",
        TypeKind::Class => "🏗️",
        TypeKind::Enum => "📋",
    }
}

/// Suffix marking how a child is attached to its parent.
fn relation_icon(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Implementation => " 🔌",
        RelationKind::Inheritance => " 🔗",
    }
}

/// Summary numbers for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub total_types: usize,
    pub total_relationships: usize,
    /// Edges leaving the target
    pub direct_parents: usize,
    /// Distinct types reachable below the target
    pub descendants: usize,
    pub classes: usize,
    pub interfaces: usize,
    pub structs: usize,
    pub enums: usize,
}

impl TreeStats {
    pub fn kind_count(&self, kind: TypeKind) -> usize {
        match kind {
            TypeKind::Class => self.classes,
            TypeKind::Interface => self.interfaces,
            TypeKind::Struct => self.structs,
            TypeKind::Enum => self.enums,
        }
    }
}

/// Renders one analysis result as indented text.
pub struct HierarchyTree<'a> {
    result: &'a AnalysisResult,
    graph: RelationGraph<'a>,
    by_name: HashMap<&'a str, &'a TypeRecord>,
    framework_bases: Vec<String>,
}

impl<'a> HierarchyTree<'a> {
    pub fn new<S: AsRef<str>>(result: &'a AnalysisResult, framework_bases: &[S]) -> Self {
        let by_name = result
            .types
            .iter()
            .map(|t| (t.full_name.as_str(), t))
            .collect();
        Self {
            result,
            graph: build_graph(result),
            by_name,
            framework_bases: framework_bases.iter().map(|b| b.as_ref().to_string()).collect(),
        }
    }

    pub fn target(&self) -> Option<&'a TypeRecord> {
        self.by_name.get(self.result.target_type.as_str()).copied()
    }

    /// `Name icon`
    pub fn label(&self, rec: &TypeRecord) -> String {
        format!("{} {}", rec.name, type_icon(rec, self.framework_bases.as_slice()))
    }

    /// Target first, then each type reached by following the first outgoing
    /// relationship of the previous one. Stops at a type with no outgoing
    /// edge or when a type would repeat.
    pub fn ancestor_chain(&self) -> Vec<&'a TypeRecord> {
        let Some(mut current) = self.target() else {
            return Vec::new();
        };
        let mut chain = vec![current];
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(current.full_name.as_str());

        while let Some(edge) = self.result.outgoing(&current.full_name).next() {
            let Some(parent) = self.by_name.get(edge.to.as_str()).copied() else {
                break;
            };
            if !seen.insert(parent.full_name.as_str()) {
                break;
            }
            chain.push(parent);
            current = parent;
        }

        chain
    }

    /// One line per chain entry, each hop indented one level further.
    pub fn ancestor_lines(&self) -> Vec<String> {
        self.ancestor_chain()
            .into_iter()
            .enumerate()
            .map(|(i, rec)| match i {
                0 => self.label(rec),
                _ => format!("{}{}{}", SPACE_INDENT.repeat(i - 1), LAST_BRANCH, self.label(rec)),
            })
            .collect()
    }

    /// Children of `parent` in display order.
    fn sorted_children(&self, parent: &'a str) -> Vec<(&'a TypeRecord, RelationKind)> {
        let mut kids: Vec<(&'a TypeRecord, RelationKind)> = children(&self.graph, parent)
            .into_iter()
            .filter_map(|(name, kind)| self.by_name.get(name).map(|rec| (*rec, kind)))
            .collect();
        kids.sort_by(|(a, ka), (b, kb)| {
            (*ka != RelationKind::Implementation)
                .cmp(&(*kb != RelationKind::Implementation))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.full_name.cmp(&b.full_name))
        });
        kids
    }

    /// The target followed by its descendants, drawn with box connectors.
    ///
    /// A child reached twice (diamond) is printed under each parent but its
    /// own children are only drawn the first time.
    pub fn descendant_lines(&self) -> Vec<String> {
        let Some(target) = self.target() else {
            return Vec::new();
        };
        let mut lines = vec![self.label(target)];
        let mut expanded = HashSet::new();
        self.push_children(target.full_name.as_str(), "", 0, &mut expanded, &mut lines);
        lines
    }

    fn push_children(
        &self,
        node: &'a str,
        indent: &str,
        depth: usize,
        expanded: &mut HashSet<&'a str>,
        lines: &mut Vec<String>,
    ) {
        if depth > TREE_RENDER_DEPTH || !expanded.insert(node) {
            return;
        }

        let kids = self.sorted_children(node);
        let last = kids.len().saturating_sub(1);
        for (i, (child, kind)) in kids.into_iter().enumerate() {
            let is_last = i == last;
            let connector = if is_last { LAST_BRANCH } else { BRANCH };
            lines.push(format!(
                "{}{}{}{}",
                indent,
                connector,
                self.label(child),
                relation_icon(kind)
            ));

            let next_indent = format!("{}{}", indent, if is_last { SPACE_INDENT } else { PIPE_INDENT });
            self.push_children(child.full_name.as_str(), &next_indent, depth + 1, expanded, lines);
        }
    }

    pub fn has_children(&self) -> bool {
        self.target()
            .map(|t| !children(&self.graph, t.full_name.as_str()).is_empty())
            .unwrap_or(false)
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            total_types: self.result.types.len(),
            total_relationships: self.result.relationships.len(),
            ..TreeStats::default()
        };

        if let Some(target) = self.target() {
            stats.direct_parents = self.result.outgoing(&target.full_name).count();
            stats.descendants = descendant_count(&self.graph, target.full_name.as_str());
        }

        for rec in &self.result.types {
            match rec.kind {
                TypeKind::Class => stats.classes += 1,
                TypeKind::Interface => stats.interfaces += 1,
                TypeKind::Struct => stats.structs += 1,
                TypeKind::Enum => stats.enums += 1,
            }
        }

        stats
    }

    /// Plain-text rendering: chain, tree and statistics.
    pub fn render_text(&self) -> HierResult<String> {
        let mut out = String::with_capacity(64 * (self.result.types.len() + 8));

        let chain = self.ancestor_lines();
        if chain.len() > 1 {
            writeln!(out, "Ancestors:")?;
            for line in &chain {
                writeln!(out, "{}", line)?;
            }
            writeln!(out)?;
        }

        if self.has_children() {
            writeln!(out, "Descendants:")?;
            for line in self.descendant_lines() {
                writeln!(out, "{}", line)?;
            }
        } else {
            writeln!(out, "No subtypes or implementors.")?;
        }
        writeln!(out)?;

        let stats = self.stats();
        writeln!(out, "Statistics:")?;
        writeln!(out, "  related types:  {}", stats.total_types)?;
        writeln!(out, "  relationships:  {}", stats.total_relationships)?;
        writeln!(out, "  direct parents: {}", stats.direct_parents)?;
        writeln!(out, "  descendants:    {}", stats.descendants)?;
        for kind in TypeKind::ALL {
            let count = stats.kind_count(kind);
            if count > 0 {
                writeln!(out, "  {:<15} {}", format!("{}:", kind.plural()), count)?;
            }
        }

        Ok(out)
    }
}
