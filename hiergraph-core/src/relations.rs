//! Relationship builder: declared supertype names → resolved edges.
//!
//! Unresolved names (platform base classes, types from assemblies that were
//! not scanned) silently produce no edge.

use tracing::trace;

use crate::model::{RelationKind, Relationship, TypeRecord};
use crate::universe::Resolver;

/// Build every edge among `types`.
///
/// One `inheritance` edge per resolved base type and, when
/// `include_interfaces` is set, one `implementation` edge per resolved
/// interface. Output order follows the input order; callers that display
/// edges should sort them.
pub fn build_relationships<'a>(
    types: impl IntoIterator<Item = &'a TypeRecord>,
    include_interfaces: bool,
) -> Vec<Relationship> {
    let resolver = Resolver::new(types);
    build_with_resolver(&resolver, include_interfaces)
}

/// Build edges using an existing resolver (its record set is the universe).
pub fn build_with_resolver(resolver: &Resolver<'_>, include_interfaces: bool) -> Vec<Relationship> {
    let mut edges = Vec::new();

    for rec in resolver.records() {
        for (declared, kind) in rec.declared_supertypes(include_interfaces) {
            match resolver.resolve(declared) {
                Some(target) if target.full_name != rec.full_name => {
                    edges.push(Relationship::new(&rec.full_name, &target.full_name, kind));
                }
                Some(_) => {
                    trace!(type_name = %rec.full_name, declared, "self reference skipped");
                }
                None => {
                    trace!(type_name = %rec.full_name, declared, "unresolved reference");
                }
            }
        }
    }

    edges
}

/// Count edges of a given kind.
pub fn count_kind(edges: &[Relationship], kind: RelationKind) -> usize {
    edges.iter().filter(|e| e.kind == kind).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeKind;

    fn sample() -> Vec<TypeRecord> {
        vec![
            TypeRecord::new("BaseController", "GameCore", TypeKind::Class)
                .with_modifier("abstract")
                .with_base("MonoBehaviour"),
            TypeRecord::new("PlayerController", "GameCore", TypeKind::Class)
                .with_base("BaseController")
                .with_interface("IControllable"),
            TypeRecord::new("IControllable", "GameCore", TypeKind::Interface),
        ]
    }

    #[test]
    fn test_builds_both_edge_kinds() {
        let types = sample();
        let mut edges = build_relationships(&types, true);
        edges.sort();
        assert_eq!(
            edges,
            vec![
                Relationship::new(
                    "GameCore.PlayerController",
                    "GameCore.BaseController",
                    RelationKind::Inheritance
                ),
                Relationship::new(
                    "GameCore.PlayerController",
                    "GameCore.IControllable",
                    RelationKind::Implementation
                ),
            ]
        );
    }

    #[test]
    fn test_interfaces_omitted_when_disabled() {
        let types = sample();
        let edges = build_relationships(&types, false);
        assert_eq!(edges.len(), 1);
        assert_eq!(count_kind(&edges, RelationKind::Implementation), 0);
    }

    #[test]
    fn test_dangling_reference_is_not_an_edge() {
        let types = sample();
        let edges = build_relationships(&types, true);
        assert!(edges.iter().all(|e| e.to != "MonoBehaviour"));
    }

    #[test]
    fn test_subset_drops_edges_to_missing_endpoints() {
        let types = sample();
        let edges = build_relationships(types.iter().skip(1), true);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, RelationKind::Implementation);
    }

    #[test]
    fn test_self_reference_ignored() {
        let types = vec![TypeRecord::new("Loop", "", TypeKind::Class).with_base("Loop")];
        assert!(build_relationships(&types, true).is_empty());
    }
}
