//! Relationship graph over an analysis result.
//!
//! Edges point from subtype to supertype, exactly like [`Relationship`]:
//! children of a node are its *incoming* neighbors, parents its outgoing ones.
//!
//! Performance characteristics:
//! - Graph build: O(|V| + |E|)
//! - Reachability: O(|V| + |E|) single BFS

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction as EdgeDirection;
use std::collections::{HashSet, VecDeque};

use crate::model::{AnalysisResult, RelationKind, Relationship};

/// Graph keyed by full name, edge weight is the relationship kind.
pub type RelationGraph<'a> = DiGraphMap<&'a str, RelationKind>;

/// Build the graph for every type and relationship in `result`.
///
/// Uses `DiGraphMap<&str, RelationKind>`: string slices borrow from the
/// result, so nothing is cloned.
pub fn build_graph(result: &AnalysisResult) -> RelationGraph<'_> {
    let mut g = DiGraphMap::with_capacity(result.types.len(), result.relationships.len());

    for rec in &result.types {
        g.add_node(rec.full_name.as_str());
    }
    for rel in &result.relationships {
        add_relationship(&mut g, rel);
    }

    g
}

fn add_relationship<'a>(g: &mut RelationGraph<'a>, rel: &'a Relationship) {
    // A pair declared both ways (base and interface) keeps the first kind.
    if !g.contains_edge(rel.from.as_str(), rel.to.as_str()) {
        g.add_edge(rel.from.as_str(), rel.to.as_str(), rel.kind);
    }
}

/// Direct children of `parent`, with the kind of the edge that links them.
pub fn children<'a>(g: &RelationGraph<'a>, parent: &'a str) -> Vec<(&'a str, RelationKind)> {
    if !g.contains_node(parent) {
        return Vec::new();
    }
    g.neighbors_directed(parent, EdgeDirection::Incoming)
        .filter_map(|child| g.edge_weight(child, parent).map(|kind| (child, *kind)))
        .collect()
}

/// Every node with a path of child edges up to `root`, `root` itself
/// excluded. Each node counts once however many paths lead to it.
fn descendants<'a>(g: &RelationGraph<'a>, root: &'a str) -> HashSet<&'a str> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();

    if g.contains_node(root) {
        visited.insert(root);
        queue.push_back(root);
    }

    while let Some(node) = queue.pop_front() {
        for n in g.neighbors_directed(node, EdgeDirection::Incoming) {
            if visited.insert(n) {
                queue.push_back(n);
            }
        }
    }

    visited.remove(root);
    visited
}

/// Number of distinct transitive descendants of `root`.
pub fn descendant_count<'a>(g: &RelationGraph<'a>, root: &'a str) -> usize {
    descendants(g, root).len()
}
