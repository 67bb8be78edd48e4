//! C# declaration extractor using native tree-sitter.
//!
//! Walks namespaces (block and file-scoped) and type declarations, including
//! nested types, and produces one [`TypeRecord`] per class, record,
//! interface, struct or enum.
//!
//! C# base lists do not say which entries are classes and which are
//! interfaces. Per declaration:
//! - interfaces and structs: every entry is an interface
//! - enums: the base list is the underlying integral type and is ignored
//! - classes: `IName` spellings are interfaces, everything else a base type
//!
//! [`reclassify_supertypes`] later corrects class entries that resolve to a
//! scanned declaration of the other kind.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;
use tree_sitter::{Node, Parser};

use super::scope::ScopePath;
use crate::error::{HierError, HierResult};
use crate::model::{MemberKind, MemberSummary, TypeKind, TypeRecord};
use crate::universe::Resolver;

/// Conventional interface spelling: `I` followed by an uppercase letter.
fn interface_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^I[A-Z]").expect("Hardcoded regex pattern is valid"))
}

/// Guess from the spelling alone whether a base-list entry is an interface.
pub fn looks_like_interface(name: &str) -> bool {
    let simple = name.rsplit('.').next().unwrap_or(name);
    interface_name_pattern().is_match(simple)
}

/// Strip `global::`, generic arguments and whitespace from a type reference.
///
/// `global::System.Collections.Generic.IList<Foo>` becomes
/// `System.Collections.Generic.IList`.
pub fn normalize_type_name(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw.strip_prefix("global::").unwrap_or(raw);
    let without_args = raw.split('<').next().unwrap_or(raw);
    without_args.split_whitespace().collect()
}

/// Reusable C# extractor. Holds one tree-sitter parser; not `Sync`, so
/// parallel callers create one per worker.
pub struct CSharpExtractor {
    parser: Parser,
}

impl CSharpExtractor {
    pub fn new() -> HierResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| HierError::parse("<grammar>", format!("failed to load C# grammar: {}", e)))?;
        Ok(Self { parser })
    }

    /// Extract all type declarations from one source unit.
    ///
    /// With `strict`, a syntax tree containing errors fails the whole unit;
    /// otherwise the error is logged and whatever parsed cleanly is kept.
    pub fn extract(&mut self, path: &Path, source: &str, strict: bool) -> HierResult<Vec<TypeRecord>> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| HierError::parse(path, "parser produced no syntax tree"))?;
        let root = tree.root_node();

        if root.has_error() {
            let line = first_error_line(root);
            if strict {
                return Err(HierError::parse_at(path, "syntax error", line));
            }
            warn!(file = %path.display(), line, "syntax error, keeping partially parsed types");
        }

        let mut walker = DeclarationWalker::new(source.as_bytes(), path);
        walker.visit_members(root);
        Ok(walker.types)
    }
}

/// 1-indexed line of the first ERROR or MISSING node.
fn first_error_line(root: Node<'_>) -> usize {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return node.start_position().row + 1;
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    root.start_position().row + 1
}

struct DeclarationWalker<'s> {
    source: &'s [u8],
    path: &'s Path,
    namespace: Vec<String>,
    enclosing: Vec<String>,
    types: Vec<TypeRecord>,
}

impl ScopePath for DeclarationWalker<'_> {
    fn namespace_parts(&self) -> &[String] {
        &self.namespace
    }

    fn enclosing_types(&self) -> &[String] {
        &self.enclosing
    }
}

impl<'s> DeclarationWalker<'s> {
    fn new(source: &'s [u8], path: &'s Path) -> Self {
        Self {
            source,
            path,
            namespace: Vec::new(),
            enclosing: Vec::new(),
            types: Vec::new(),
        }
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn field_text(&self, node: Node<'_>, field: &str) -> Option<&'s str> {
        node.child_by_field_name(field)
            .map(|n| self.text(n))
            .filter(|s| !s.is_empty())
    }

    /// Visit a compilation unit, namespace body or file-scoped namespace.
    fn visit_members(&mut self, container: Node<'_>) {
        let mut cursor = container.walk();
        let children: Vec<Node<'_>> = container.named_children(&mut cursor).collect();
        // A file-scoped namespace applies to the siblings that follow it.
        let mut file_scoped = 0usize;

        for child in children {
            match child.kind() {
                "namespace_declaration" => {
                    let pushed = self.push_namespace(child);
                    if let Some(body) = child.child_by_field_name("body") {
                        self.visit_members(body);
                    }
                    self.pop_namespace(pushed);
                }
                "file_scoped_namespace_declaration" => {
                    file_scoped += self.push_namespace(child);
                    self.visit_members(child);
                }
                kind if type_kind_of(kind).is_some() => self.visit_type(child),
                _ => {}
            }
        }

        self.pop_namespace(file_scoped);
    }

    fn push_namespace(&mut self, node: Node<'_>) -> usize {
        let Some(name) = self.field_text(node, "name") else {
            return 0;
        };
        let parts: Vec<String> = normalize_type_name(name)
            .split('.')
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();
        let count = parts.len();
        self.namespace.extend(parts);
        count
    }

    fn pop_namespace(&mut self, count: usize) {
        let keep = self.namespace.len().saturating_sub(count);
        self.namespace.truncate(keep);
    }

    fn visit_type(&mut self, node: Node<'_>) {
        let Some(kind) = type_kind_of(node.kind()) else {
            return;
        };
        let Some(name) = self.field_text(node, "name") else {
            return;
        };
        let kind = if kind == TypeKind::Class && has_token(node, "struct") {
            // `record struct`
            TypeKind::Struct
        } else {
            kind
        };

        let mut record = TypeRecord::new(name, self.namespace_path(), kind);
        record.full_name = self.qualified_name(name);
        record.source = Some(self.path.to_path_buf());
        record.modifiers = self.modifiers(node);

        if kind != TypeKind::Enum {
            for entry in self.base_list(node) {
                let is_interface = match kind {
                    TypeKind::Interface | TypeKind::Struct => true,
                    _ => looks_like_interface(&entry),
                };
                if is_interface {
                    record.interfaces.push(entry);
                } else {
                    record.base_types.push(entry);
                }
            }
        }

        let mut nested = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for member in body.named_children(&mut cursor) {
                if type_kind_of(member.kind()).is_some() {
                    nested.push(member);
                } else {
                    self.collect_member(member, &mut record.members);
                }
            }
        }

        self.types.push(record);

        if !nested.is_empty() {
            self.enclosing.push(name.to_string());
            for child in nested {
                self.visit_type(child);
            }
            self.enclosing.pop();
        }
    }

    fn modifiers(&self, node: Node<'_>) -> Vec<String> {
        let mut cursor = node.walk();
        let mut out: Vec<String> = Vec::new();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "modifier" {
                let text = self.text(child).trim().to_string();
                if !text.is_empty() && !out.contains(&text) {
                    out.push(text);
                }
            }
        }
        out
    }

    /// Normalized entries of the declaration's base list, in order.
    fn base_list(&self, node: Node<'_>) -> Vec<String> {
        let mut cursor = node.walk();
        let Some(list) = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "base_list")
        else {
            return Vec::new();
        };

        let mut entries = Vec::new();
        let mut list_cursor = list.walk();
        for entry in list.named_children(&mut list_cursor) {
            let type_node = match entry.kind() {
                "argument_list" => continue,
                // `class Derived(int x) : Base(x)`
                "primary_constructor_base_type" => match entry.named_child(0) {
                    Some(inner) => inner,
                    None => continue,
                },
                _ => entry,
            };
            let name = normalize_type_name(self.text(type_node));
            if !name.is_empty() {
                entries.push(name);
            }
        }
        entries
    }

    fn collect_member(&self, node: Node<'_>, members: &mut Vec<MemberSummary>) {
        match node.kind() {
            "method_declaration" => {
                if let Some(name) = self.field_text(node, "name") {
                    let declared_type = self
                        .field_text(node, "returns")
                        .or_else(|| self.field_text(node, "type"))
                        .map(String::from);
                    members.push(MemberSummary {
                        name: name.to_string(),
                        kind: MemberKind::Method,
                        modifiers: self.modifiers(node),
                        declared_type,
                    });
                }
            }
            "constructor_declaration" => {
                if let Some(name) = self.field_text(node, "name") {
                    members.push(MemberSummary {
                        name: name.to_string(),
                        kind: MemberKind::Constructor,
                        modifiers: self.modifiers(node),
                        declared_type: None,
                    });
                }
            }
            "property_declaration" => {
                if let Some(name) = self.field_text(node, "name") {
                    members.push(MemberSummary {
                        name: name.to_string(),
                        kind: MemberKind::Property,
                        modifiers: self.modifiers(node),
                        declared_type: self.field_text(node, "type").map(String::from),
                    });
                }
            }
            "field_declaration" | "event_field_declaration" => {
                let kind = if node.kind() == "field_declaration" {
                    MemberKind::Field
                } else {
                    MemberKind::Event
                };
                let modifiers = self.modifiers(node);
                let mut cursor = node.walk();
                let Some(decl) = node
                    .named_children(&mut cursor)
                    .find(|c| c.kind() == "variable_declaration")
                else {
                    return;
                };
                let declared_type = self.field_text(decl, "type").map(String::from);
                let mut decl_cursor = decl.walk();
                for declarator in decl.named_children(&mut decl_cursor) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    let name = self.field_text(declarator, "name").or_else(|| {
                        declarator
                            .named_child(0)
                            .filter(|n| n.kind() == "identifier")
                            .map(|n| self.text(n))
                    });
                    if let Some(name) = name {
                        members.push(MemberSummary {
                            name: name.to_string(),
                            kind,
                            modifiers: modifiers.clone(),
                            declared_type: declared_type.clone(),
                        });
                    }
                }
            }
            _ => {}
        }
    }
}

fn type_kind_of(node_kind: &str) -> Option<TypeKind> {
    match node_kind {
        "class_declaration" | "record_declaration" => Some(TypeKind::Class),
        "interface_declaration" => Some(TypeKind::Interface),
        "struct_declaration" | "record_struct_declaration" => Some(TypeKind::Struct),
        "enum_declaration" => Some(TypeKind::Enum),
        _ => None,
    }
}

/// Does the node have a direct anonymous child token of this kind?
fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == token);
    found
}

/// Move class base-list entries to the right bucket when they resolve to a
/// scanned declaration: an entry naming an interface becomes an interface,
/// an entry naming anything else becomes a base type. Unresolved entries
/// keep the spelling-based guess.
pub fn reclassify_supertypes(records: &mut [TypeRecord]) {
    let updates: Vec<(usize, Vec<String>, Vec<String>)> = {
        let resolver = Resolver::new(records.iter());
        records
            .iter()
            .enumerate()
            .filter(|(_, rec)| rec.kind == TypeKind::Class)
            .filter_map(|(i, rec)| {
                let mut bases = Vec::new();
                let mut ifaces = Vec::new();
                for name in rec.base_types.iter().chain(rec.interfaces.iter()) {
                    let is_interface = match resolver.resolve(name) {
                        Some(target) => target.kind == TypeKind::Interface,
                        None => !rec.base_types.contains(name),
                    };
                    if is_interface {
                        ifaces.push(name.clone());
                    } else {
                        bases.push(name.clone());
                    }
                }
                let changed = bases != rec.base_types || ifaces != rec.interfaces;
                changed.then_some((i, bases, ifaces))
            })
            .collect()
    };

    for (i, bases, ifaces) in updates {
        records[i].base_types = bases;
        records[i].interfaces = ifaces;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract(source: &str) -> Vec<TypeRecord> {
        let mut extractor = CSharpExtractor::new().unwrap();
        extractor
            .extract(&PathBuf::from("Test.cs"), source, true)
            .unwrap()
    }

    fn find<'a>(types: &'a [TypeRecord], full_name: &str) -> &'a TypeRecord {
        types
            .iter()
            .find(|t| t.full_name == full_name)
            .unwrap_or_else(|| panic!("missing {}", full_name))
    }

    #[test]
    fn test_grammar_matches_runtime() {
        // Fails when the grammar crate ships an ABI the runtime rejects.
        let extractor = CSharpExtractor::new();
        assert!(extractor.is_ok(), "C# grammar failed to load: {:?}", extractor.err());
    }

    #[test]
    fn test_looks_like_interface() {
        assert!(looks_like_interface("IControllable"));
        assert!(looks_like_interface("System.IDisposable"));
        assert!(!looks_like_interface("Item"));
        assert!(!looks_like_interface("Inventory"));
        assert!(!looks_like_interface("MonoBehaviour"));
    }

    #[test]
    fn test_normalize_type_name() {
        assert_eq!(normalize_type_name("List<int>"), "List");
        assert_eq!(
            normalize_type_name("global::System.Collections.Generic.IList<Foo>"),
            "System.Collections.Generic.IList"
        );
        assert_eq!(normalize_type_name(" UnityEngine . MonoBehaviour "), "UnityEngine.MonoBehaviour");
    }

    #[test]
    fn test_extract_class_with_bases() {
        let types = extract(
            r#"
namespace GameCore
{
    public class PlayerController : BaseController, IControllable
    {
    }
}
"#,
        );
        assert_eq!(types.len(), 1);
        let player = &types[0];
        assert_eq!(player.name, "PlayerController");
        assert_eq!(player.full_name, "GameCore.PlayerController");
        assert_eq!(player.namespace, "GameCore");
        assert_eq!(player.kind, TypeKind::Class);
        assert_eq!(player.base_types, vec!["BaseController"]);
        assert_eq!(player.interfaces, vec!["IControllable"]);
        assert_eq!(player.modifiers, vec!["public"]);
        assert_eq!(player.source, Some(PathBuf::from("Test.cs")));
    }

    #[test]
    fn test_extract_abstract_modifier() {
        let types = extract("public abstract class BaseController : MonoBehaviour { }");
        assert!(types[0].is_abstract());
        assert_eq!(types[0].base_types, vec!["MonoBehaviour"]);
        assert_eq!(types[0].full_name, "BaseController");
    }

    #[test]
    fn test_extract_all_kinds() {
        let types = extract(
            r#"
namespace N
{
    public interface IShape : IDrawable { }
    public struct Point : IEquatable<Point> { }
    public enum Color : byte { Red, Green }
    public class Circle { }
}
"#,
        );
        assert_eq!(find(&types, "N.IShape").kind, TypeKind::Interface);
        assert_eq!(find(&types, "N.IShape").interfaces, vec!["IDrawable"]);
        let point = find(&types, "N.Point");
        assert_eq!(point.kind, TypeKind::Struct);
        assert_eq!(point.interfaces, vec!["IEquatable"]);
        let color = find(&types, "N.Color");
        assert_eq!(color.kind, TypeKind::Enum);
        assert!(color.base_types.is_empty() && color.interfaces.is_empty());
        assert_eq!(find(&types, "N.Circle").kind, TypeKind::Class);
    }

    #[test]
    fn test_extract_nested_namespaces_and_types() {
        let types = extract(
            r#"
namespace Game
{
    namespace Core
    {
        public class Outer
        {
            public class Inner : Outer { }
        }
    }
}
"#,
        );
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].full_name, "Game.Core.Outer");
        let inner = &types[1];
        assert_eq!(inner.full_name, "Game.Core.Outer.Inner");
        assert_eq!(inner.namespace, "Game.Core");
        assert_eq!(inner.base_types, vec!["Outer"]);
    }

    #[test]
    fn test_extract_dotted_namespace() {
        let types = extract("namespace Game.Core { class A { } }");
        assert_eq!(types[0].full_name, "Game.Core.A");
        assert_eq!(types[0].namespace, "Game.Core");
    }

    #[test]
    fn test_extract_file_scoped_namespace() {
        let types = extract("namespace Game.Ui;\n\npublic class Hud : Widget { }\n");
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].full_name, "Game.Ui.Hud");
    }

    #[test]
    fn test_extract_members() {
        let types = extract(
            r#"
public class Enemy
{
    private float attackRange = 2.0f, attackDamage;
    public int Health { get; set; }
    public Enemy() { }
    public void Attack() { }
}
"#,
        );
        let members = &types[0].members;
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["attackRange", "attackDamage", "Health", "Enemy", "Attack"]);
        assert_eq!(members[0].kind, MemberKind::Field);
        assert_eq!(members[0].declared_type.as_deref(), Some("float"));
        assert_eq!(members[2].kind, MemberKind::Property);
        assert_eq!(members[3].kind, MemberKind::Constructor);
        assert_eq!(members[4].kind, MemberKind::Method);
        assert_eq!(members[4].declared_type.as_deref(), Some("void"));
        assert_eq!(members[4].modifiers, vec!["public"]);
    }

    #[test]
    fn test_generic_bases_are_normalized() {
        let types = extract("class Repo<T> : BaseRepo<T>, IRepository<T> { }");
        assert_eq!(types[0].name, "Repo");
        assert_eq!(types[0].base_types, vec!["BaseRepo"]);
        assert_eq!(types[0].interfaces, vec!["IRepository"]);
    }

    #[test]
    fn test_strict_rejects_syntax_errors() {
        let mut extractor = CSharpExtractor::new().unwrap();
        let err = extractor
            .extract(&PathBuf::from("Broken.cs"), "public class { {", true)
            .unwrap_err();
        assert!(matches!(err, HierError::Parse { .. }));
    }

    #[test]
    fn test_lenient_keeps_parsed_types() {
        let mut extractor = CSharpExtractor::new().unwrap();
        let types = extractor
            .extract(
                &PathBuf::from("Partial.cs"),
                "public class Good : Base { }\npublic class Bad : { void M( }",
                false,
            )
            .unwrap();
        assert!(types.iter().any(|t| t.name == "Good"));
    }

    #[test]
    fn test_reclassify_supertypes() {
        let mut records = vec![
            TypeRecord::new("Damageable", "", TypeKind::Interface),
            TypeRecord::new("Item", "", TypeKind::Class),
            TypeRecord::new("Sword", "", TypeKind::Class)
                .with_base("Damageable")
                .with_interface("Item"),
            TypeRecord::new("Shield", "", TypeKind::Class).with_interface("IUnknown"),
        ];
        reclassify_supertypes(&mut records);
        assert_eq!(records[2].base_types, vec!["Item"]);
        assert_eq!(records[2].interfaces, vec!["Damageable"]);
        // Unresolved names keep the spelling-based guess.
        assert_eq!(records[3].interfaces, vec!["IUnknown"]);
    }
}
