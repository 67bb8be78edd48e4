//! Type-relationship data model.
//!
//! Everything the traversal engine and the renderers exchange lives here:
//! extracted [`TypeRecord`]s, derived [`Relationship`] edges, the per-run
//! [`TraversalOptions`] and the resulting [`AnalysisResult`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{HierError, HierResult};

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Struct => "struct",
            Self::Enum => "enum",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Self::Class => "classes",
            Self::Interface => "interfaces",
            Self::Struct => "structs",
            Self::Enum => "enums",
        }
    }

    /// All kinds, in histogram order.
    pub const ALL: [TypeKind; 4] = [Self::Class, Self::Interface, Self::Struct, Self::Enum];
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a member declared inside a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Constructor,
    Property,
    Field,
    Event,
}

/// Summary of a single member. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub name: String,
    pub kind: MemberKind,
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Return type for methods, declared type for fields/properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
}

/// One declared type or interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRecord {
    /// Simple identifier
    pub name: String,
    /// Namespace-qualified identifier; canonical key
    pub full_name: String,
    /// Enclosing namespace, empty for the global namespace
    #[serde(default)]
    pub namespace: String,
    pub kind: TypeKind,
    /// Declared base types, in declaration order
    #[serde(default)]
    pub base_types: Vec<String>,
    /// Declared interfaces, in declaration order
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberSummary>,
    /// File the declaration was extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl TypeRecord {
    /// Create a record in `namespace` (empty for global). The full name is
    /// `namespace.name`, or just `name` in the global namespace.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, kind: TypeKind) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        let full_name = qualify(&namespace, &name);
        Self {
            name,
            full_name,
            namespace,
            kind,
            base_types: Vec::new(),
            interfaces: Vec::new(),
            modifiers: Vec::new(),
            members: Vec::new(),
            source: None,
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_types.push(base.into());
        self
    }

    pub fn with_interface(mut self, iface: impl Into<String>) -> Self {
        self.interfaces.push(iface.into());
        self
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        let modifier = modifier.into();
        if !self.modifiers.contains(&modifier) {
            self.modifiers.push(modifier);
        }
        self
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Derived from modifiers.
    pub fn is_abstract(&self) -> bool {
        self.has_modifier("abstract")
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    /// Does a declared base type name one of `bases`? Qualified spellings
    /// such as `UnityEngine.MonoBehaviour` match `MonoBehaviour`.
    pub fn derives_directly_from<S: AsRef<str>>(&self, bases: &[S]) -> bool {
        self.base_types.iter().any(|declared| {
            let simple = declared.rsplit('.').next().unwrap_or(declared);
            bases
                .iter()
                .any(|b| declared == b.as_ref() || simple == b.as_ref())
        })
    }

    /// Declared supertypes paired with the relationship kind they would form.
    pub fn declared_supertypes(
        &self,
        include_interfaces: bool,
    ) -> impl Iterator<Item = (&str, RelationKind)> {
        let bases = self
            .base_types
            .iter()
            .map(|b| (b.as_str(), RelationKind::Inheritance));
        let ifaces = self
            .interfaces
            .iter()
            .filter(move |_| include_interfaces)
            .map(|i| (i.as_str(), RelationKind::Implementation));
        bases.chain(ifaces)
    }
}

/// Join a namespace and a simple name with `.`.
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

/// Kind of a directed type relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// `from` extends `to`
    Inheritance,
    /// `from` implements `to`
    Implementation,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inheritance => "inheritance",
            Self::Implementation => "implementation",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge from a subtype/implementor to a supertype/interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relationship {
    /// Full name of the subtype or implementor
    pub from: String,
    /// Full name of the supertype or interface
    pub to: String,
    pub kind: RelationKind,
}

impl Relationship {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.kind)
    }
}

/// Which way the traversal expands from the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ancestors only
    Up,
    /// Descendants only
    Down,
    #[default]
    Both,
}

impl Direction {
    pub fn walks_up(&self) -> bool {
        matches!(self, Self::Up | Self::Both)
    }

    pub fn walks_down(&self) -> bool {
        matches!(self, Self::Down | Self::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Both => "both",
        }
    }
}

impl FromStr for Direction {
    type Err = HierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "both" => Ok(Self::Both),
            other => Err(HierError::invalid_argument(format!(
                "unknown direction '{}', expected up, down or both",
                other
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Framework root types filtered out unless the caller overrides the list.
pub const DEFAULT_EXCLUDED_TYPES: &[&str] = &[
    "MonoBehaviour",
    "ScriptableObject",
    "Component",
    "Behaviour",
    "UnityEngine.MonoBehaviour",
    "UnityEngine.ScriptableObject",
    "UnityEngine.Component",
    "UnityEngine.Behaviour",
    "UnityEngine.Object",
];

/// Base classes whose direct subclasses render as framework components.
pub const DEFAULT_FRAMEWORK_BASES: &[&str] = &["MonoBehaviour"];

/// Options for a single traversal run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalOptions {
    pub target_identifier: String,
    pub direction: Direction,
    pub max_depth: usize,
    pub include_interfaces: bool,
    pub excluded_type_names: BTreeSet<String>,
}

impl TraversalOptions {
    pub const MIN_DEPTH: usize = 1;
    pub const MAX_DEPTH: usize = 20;
    pub const DEFAULT_DEPTH: usize = 10;

    /// Options with the documented defaults: both directions, depth 10,
    /// interfaces included, framework roots excluded.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target_identifier: target.into(),
            direction: Direction::Both,
            max_depth: Self::DEFAULT_DEPTH,
            include_interfaces: true,
            excluded_type_names: Self::default_excluded_types(),
        }
    }

    pub fn default_excluded_types() -> BTreeSet<String> {
        DEFAULT_EXCLUDED_TYPES.iter().map(|s| s.to_string()).collect()
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

    /// Replace the exclusion list.
    pub fn excluded_types(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_type_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_type_names.contains(name)
    }

    /// Check the target and the depth range.
    pub fn validate(&self) -> HierResult<()> {
        if self.target_identifier.trim().is_empty() {
            return Err(HierError::invalid_argument("target type must not be empty"));
        }
        if !(Self::MIN_DEPTH..=Self::MAX_DEPTH).contains(&self.max_depth) {
            return Err(HierError::invalid_argument(format!(
                "max depth must be between {} and {}, got {}",
                Self::MIN_DEPTH,
                Self::MAX_DEPTH,
                self.max_depth
            )));
        }
        Ok(())
    }
}

/// The subgraph computed around a target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Identifier as the caller supplied it
    pub query: String,
    /// Options the run was computed with
    pub options: TraversalOptions,
    /// Full name of the resolved target
    pub target_type: String,
    /// Target first, then reached types in discovery order
    pub types: Vec<TypeRecord>,
    /// Edges whose both endpoints are in `types`
    pub relationships: Vec<Relationship>,
}

impl AnalysisResult {
    /// The resolved target record.
    pub fn target(&self) -> Option<&TypeRecord> {
        self.get(&self.target_type)
    }

    pub fn get(&self, full_name: &str) -> Option<&TypeRecord> {
        self.types.iter().find(|t| t.full_name == full_name)
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.get(full_name).is_some()
    }

    /// Full names of all types, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.iter().map(|t| t.full_name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Relationships sorted for display and comparison.
    pub fn sorted_relationships(&self) -> Vec<&Relationship> {
        let mut rels: Vec<&Relationship> = self.relationships.iter().collect();
        rels.sort();
        rels
    }

    /// Relationships leaving `full_name`, in list order.
    pub fn outgoing<'a>(&'a self, full_name: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.relationships.iter().filter(move |r| r.from == full_name)
    }
}
