//! Diagram renderer: Mermaid flowchart of an analysis result.
//!
//! Types other than the target are partitioned into three groups:
//!
//! 1. interfaces (by kind)
//! 2. parents: the target has an edge to them
//! 3. children: they have an edge to the target, plus anything else reached
//!    (grandparents, grandchildren)
//!
//! Groups are emitted as `subgraph` blocks with the target standing alone
//! between them, followed by one edge per relationship: `-->|extends|` for
//! inheritance, `-.->|implements|` for implementation.

use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

use crate::error::HierResult;
use crate::model::{AnalysisResult, RelationKind, TypeKind, TypeRecord, DEFAULT_FRAMEWORK_BASES};

/// Visual class of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Interface,
    /// Directly derives from a recognized framework base
    FrameworkComponent,
    Abstract,
    Default,
}

impl NodeClass {
    /// Class name used in `classDef` directives.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interface => "interface",
            Self::FrameworkComponent => "frameworkComponent",
            Self::Abstract => "abstract",
            Self::Default => "default",
        }
    }

    /// Fill and stroke colors.
    pub fn colors(&self) -> (&'static str, &'static str) {
        match self {
            Self::Interface => ("#2196F3", "#1976D2"),
            Self::FrameworkComponent => ("#4CAF50", "#2E7D32"),
            Self::Abstract => ("#9C27B0", "#7B1FA2"),
            Self::Default => ("#ECEFF1", "#90A4AE"),
        }
    }

    fn icon(&self) -> Option<&'static str> {
        match self {
            Self::Interface => Some("🔌"),
            Self::FrameworkComponent => Some("🎮"),
            Self::Abstract => Some("📐"),
            Self::Default => None,
        }
    }
}

/// Pick the visual class of a record. First match wins: interface kind,
/// framework component, abstract, default.
pub fn classify<S: AsRef<str>>(rec: &TypeRecord, framework_bases: &[S]) -> NodeClass {
    if rec.kind == TypeKind::Interface {
        NodeClass::Interface
    } else if rec.derives_directly_from(framework_bases) {
        NodeClass::FrameworkComponent
    } else if rec.is_abstract() {
        NodeClass::Abstract
    } else {
        NodeClass::Default
    }
}

fn non_identifier_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("Hardcoded regex pattern is valid"))
}

/// Prefix reserved for subgraph ids; node ids never start with it.
const GROUP_PREFIX: &str = "grp_";

/// Node id for a full name: every character outside `[A-Za-z0-9_]` becomes
/// `_`. Distinct names may collide (`A.B` and `A_B`); that is accepted.
/// An id that would start with the group prefix gets a leading `_`.
pub fn sanitize_id(full_name: &str) -> String {
    let id = non_identifier_chars().replace_all(full_name, "_");
    if id.starts_with(GROUP_PREFIX) {
        format!("_{}", id)
    } else {
        id.into_owned()
    }
}

/// Non-target types grouped by their position relative to the target.
/// Each group is sorted by full name.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub parents: Vec<&'a TypeRecord>,
    pub interfaces: Vec<&'a TypeRecord>,
    pub children: Vec<&'a TypeRecord>,
}

/// Split `result.types` minus the target into parents, interfaces and
/// children.
pub fn partition(result: &AnalysisResult) -> Partition<'_> {
    let target = result.target_type.as_str();
    let mut groups = Partition::default();

    for rec in result.types.iter().filter(|t| t.full_name != target) {
        let is_parent = result
            .relationships
            .iter()
            .any(|r| r.from == target && r.to == rec.full_name);

        if rec.kind == TypeKind::Interface {
            groups.interfaces.push(rec);
        } else if is_parent {
            groups.parents.push(rec);
        } else {
            // Children of the target and everything else reached.
            groups.children.push(rec);
        }
    }

    for group in [&mut groups.parents, &mut groups.interfaces, &mut groups.children] {
        group.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    }
    groups
}

/// Rendering switches for [`render_mermaid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramOptions {
    /// Emit `classDef`/`class` styling directives
    pub styled: bool,
    /// Base classes that mark a framework component
    pub framework_bases: Vec<String>,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            styled: true,
            framework_bases: DEFAULT_FRAMEWORK_BASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DiagramOptions {
    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn framework_bases(mut self, bases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.framework_bases = bases.into_iter().map(Into::into).collect();
        self
    }

    pub fn classify(&self, rec: &TypeRecord) -> NodeClass {
        classify(rec, self.framework_bases.as_slice())
    }
}

/// `id{"🔌 Name"}` for interfaces, `id["🎮 Name"]` otherwise.
fn node_decl(rec: &TypeRecord, class: NodeClass, marker: Option<&str>) -> String {
    let mut label = String::new();
    if let Some(marker) = marker {
        label.push_str(marker);
        label.push(' ');
    }
    if let Some(icon) = class.icon() {
        label.push_str(icon);
        label.push(' ');
    }
    label.push_str(&rec.name.replace('"', "#quot;"));

    let (open, close) = match class {
        NodeClass::Interface => ('{', '}'),
        _ => ('[', ']'),
    };
    format!("{}{}\"{}\"{}", sanitize_id(&rec.full_name), open, label, close)
}

fn write_group(
    out: &mut String,
    id: &str,
    title: &str,
    members: &[&TypeRecord],
    options: &DiagramOptions,
) -> std::fmt::Result {
    if members.is_empty() {
        return Ok(());
    }
    writeln!(out, "    subgraph {}{}[\"{}\"]", GROUP_PREFIX, id, title)?;
    writeln!(out, "        direction TB")?;
    for rec in members {
        writeln!(out, "        {}", node_decl(rec, options.classify(rec), None))?;
    }
    writeln!(out, "    end")
}

/// Render `result` as a Mermaid `flowchart TB` description.
pub fn render_mermaid(result: &AnalysisResult, options: &DiagramOptions) -> HierResult<String> {
    let mut out = String::with_capacity(96 * (result.types.len() + result.relationships.len()) + 256);
    writeln!(out, "flowchart TB")?;

    let groups = partition(result);
    write_group(&mut out, "parents", "📈 Parents", &groups.parents, options)?;
    write_group(&mut out, "interfaces", "🔌 Interfaces", &groups.interfaces, options)?;

    if let Some(target) = result.target() {
        writeln!(out, "    {}", node_decl(target, options.classify(target), Some("🎯")))?;
    }

    let children_title = format!("📊 Children ({})", groups.children.len());
    write_group(&mut out, "children", &children_title, &groups.children, options)?;

    for rel in result.sorted_relationships() {
        let connector = match rel.kind {
            RelationKind::Inheritance => "-->|extends|",
            RelationKind::Implementation => "-.->|implements|",
        };
        writeln!(
            out,
            "    {} {} {}",
            sanitize_id(&rel.from),
            connector,
            sanitize_id(&rel.to)
        )?;
    }

    if options.styled {
        write_styles(&mut out, result, options)?;
    }

    Ok(out)
}

fn write_styles(out: &mut String, result: &AnalysisResult, options: &DiagramOptions) -> std::fmt::Result {
    writeln!(out)?;
    for class in [NodeClass::FrameworkComponent, NodeClass::Interface, NodeClass::Abstract] {
        let (fill, stroke) = class.colors();
        writeln!(out, "    classDef {} fill:{},stroke:{},color:#fff;", class.as_str(), fill, stroke)?;
    }

    let mut styled: Vec<(String, NodeClass)> = result
        .types
        .iter()
        .map(|t| (sanitize_id(&t.full_name), options.classify(t)))
        .filter(|(_, class)| *class != NodeClass::Default)
        .collect();
    styled.sort_by(|a, b| a.0.cmp(&b.0));

    for (id, class) in styled {
        writeln!(out, "    class {} {};", id, class.as_str())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Direction, TraversalOptions};
    use crate::traverse::analyze;
    use crate::universe::TypeUniverse;

    fn sample() -> Vec<TypeRecord> {
        vec![
            TypeRecord::new("BaseController", "Game", TypeKind::Class)
                .with_modifier("abstract")
                .with_base("MonoBehaviour"),
            TypeRecord::new("PlayerController", "Game", TypeKind::Class)
                .with_base("BaseController")
                .with_interface("IControllable"),
            TypeRecord::new("IControllable", "Game", TypeKind::Interface),
            TypeRecord::new("FastPlayer", "Game", TypeKind::Class).with_base("PlayerController"),
            TypeRecord::new("Shape", "Game", TypeKind::Class).with_modifier("abstract"),
        ]
    }

    fn analyze_player(direction: Direction) -> AnalysisResult {
        let universe = TypeUniverse::from_records(sample());
        analyze(&universe, &TraversalOptions::new("PlayerController").direction(direction)).unwrap()
    }

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("Game.Core.Player"), "Game_Core_Player");
        assert_eq!(sanitize_id("Outer+Inner`1"), "Outer_Inner_1");
        assert_eq!(sanitize_id("Plain_Name9"), "Plain_Name9");
        assert_eq!(sanitize_id("grp_children"), "_grp_children");
    }

    #[test]
    fn test_group_ids_never_clash_with_type_ids() {
        let universe = TypeUniverse::from_records(vec![
            TypeRecord::new("Parents", "", TypeKind::Class),
            TypeRecord::new("Root", "", TypeKind::Class).with_base("Parents"),
            TypeRecord::new("Children", "", TypeKind::Class).with_base("Root"),
            TypeRecord::new("grp_children", "", TypeKind::Class).with_base("Root"),
        ]);
        let result = analyze(&universe, &TraversalOptions::new("Root")).unwrap();
        let text = render_mermaid(&result, &DiagramOptions::default()).unwrap();

        assert!(text.contains("    subgraph grp_parents[\"📈 Parents\"]\n"));
        assert!(text.contains("    subgraph grp_children[\"📊 Children (2)\"]\n"));
        assert!(text.contains("        Children[\"Children\"]\n"));
        assert!(text.contains("        _grp_children[\"grp_children\"]\n"));
        assert!(!text.contains("subgraph Children"));
        assert!(!text.contains("subgraph Parents"));
    }

    #[test]
    fn test_classify_priority() {
        let opts = DiagramOptions::default();
        let iface = TypeRecord::new("IFoo", "", TypeKind::Interface).with_base("MonoBehaviour");
        assert_eq!(opts.classify(&iface), NodeClass::Interface);

        let component = TypeRecord::new("Mover", "", TypeKind::Class)
            .with_modifier("abstract")
            .with_base("MonoBehaviour");
        assert_eq!(opts.classify(&component), NodeClass::FrameworkComponent);

        let shape = TypeRecord::new("Shape", "", TypeKind::Class).with_modifier("abstract");
        assert_eq!(opts.classify(&shape), NodeClass::Abstract);

        let plain = TypeRecord::new("Item", "", TypeKind::Class);
        assert_eq!(opts.classify(&plain), NodeClass::Default);

        let custom = DiagramOptions::default().framework_bases(["Node"]);
        let godot = TypeRecord::new("Player", "", TypeKind::Class).with_base("Node");
        assert_eq!(custom.classify(&godot), NodeClass::FrameworkComponent);
    }

    #[test]
    fn test_partition() {
        let result = analyze_player(Direction::Both);
        let groups = partition(&result);
        let names = |g: &[&TypeRecord]| g.iter().map(|t| t.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&groups.parents), vec!["BaseController"]);
        assert_eq!(names(&groups.interfaces), vec!["IControllable"]);
        assert_eq!(names(&groups.children), vec!["FastPlayer"]);
    }

    #[test]
    fn test_unrelated_reached_type_defaults_to_children() {
        let universe = TypeUniverse::from_records(sample());
        // Grandchild of BaseController lands in the children group.
        let result = analyze(
            &universe,
            &TraversalOptions::new("BaseController").direction(Direction::Down),
        )
        .unwrap();
        let groups = partition(&result);
        assert!(groups.parents.is_empty());
        assert_eq!(groups.children.len(), 2);
    }

    #[test]
    fn test_render_mermaid_structure() {
        let result = analyze_player(Direction::Both);
        let text = render_mermaid(&result, &DiagramOptions::default()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "flowchart TB");
        assert_eq!(lines[1], "    subgraph grp_parents[\"📈 Parents\"]");
        assert_eq!(lines[2], "        direction TB");
        assert_eq!(lines[3], "        Game_BaseController[\"🎮 BaseController\"]");
        assert_eq!(lines[4], "    end");
        assert_eq!(lines[5], "    subgraph grp_interfaces[\"🔌 Interfaces\"]");
        assert_eq!(lines[7], "        Game_IControllable{\"🔌 IControllable\"}");
        assert_eq!(lines[9], "    Game_PlayerController[\"🎯 PlayerController\"]");
        assert_eq!(lines[10], "    subgraph grp_children[\"📊 Children (1)\"]");

        assert!(text.contains("    Game_PlayerController -->|extends| Game_BaseController\n"));
        assert!(text.contains("    Game_PlayerController -.->|implements| Game_IControllable\n"));
        assert!(text.contains("    Game_FastPlayer -->|extends| Game_PlayerController\n"));
        assert!(text.contains("classDef frameworkComponent fill:#4CAF50"));
        assert!(text.contains("    class Game_BaseController frameworkComponent;\n"));
        assert!(text.contains("    class Game_IControllable interface;\n"));
        assert!(!text.contains("class Game_FastPlayer"));
    }

    #[test]
    fn test_render_mermaid_unstyled() {
        let result = analyze_player(Direction::Up);
        let text = render_mermaid(&result, &DiagramOptions::default().styled(false)).unwrap();
        assert!(!text.contains("classDef"));
        assert!(!text.contains("Children"));
    }

    #[test]
    fn test_edges_follow_relationship_order() {
        let result = analyze_player(Direction::Both);
        let text = render_mermaid(&result, &DiagramOptions::default().styled(false)).unwrap();
        let edges: Vec<&str> = text.lines().filter(|l| l.contains('|')).collect();
        assert_eq!(
            edges,
            vec![
                "    Game_FastPlayer -->|extends| Game_PlayerController",
                "    Game_PlayerController -->|extends| Game_BaseController",
                "    Game_PlayerController -.->|implements| Game_IControllable",
            ]
        );
    }

    #[test]
    fn test_label_quotes_escaped() {
        let rec = TypeRecord::new("Odd\"Name", "", TypeKind::Class);
        let decl = node_decl(&rec, NodeClass::Default, None);
        assert_eq!(decl, "Odd_Name[\"Odd#quot;Name\"]");
    }
}
