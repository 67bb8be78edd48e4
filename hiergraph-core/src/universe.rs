//! The set of known types and name resolution against it.
//!
//! Resolution is a three-tier fallback:
//!
//! 1. exact `full_name` match
//! 2. exact simple `name` match
//! 3. the declared name is a dotted suffix of a `full_name`
//!    (`Core.Base` finds `Game.Core.Base`)
//!
//! Tiers 2 and 3 return the first candidate in iteration order. Two unrelated
//! namespaces that both declare `Base` are therefore conflated: the one
//! scanned first wins. This is a known ambiguity, not a correctness guarantee.
//!
//! The descendant test [`type_matches`] is looser still: it only compares
//! the last segment, so a type declaring `Other.Base` counts as a child of
//! `Game.Base`. The edge for that child is then resolved against the reached
//! set, finds no `Other.Base`, and is dropped, so the child shows up in the
//! result with no relationship linking it.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::model::TypeRecord;

/// Resolves declared type names against a set of records.
///
/// Borrowing; build one per record set (the full universe, or the subset
/// reached by a traversal).
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    records: Vec<&'a TypeRecord>,
    by_full_name: HashMap<&'a str, &'a TypeRecord>,
}

impl<'a> Resolver<'a> {
    pub fn new(records: impl IntoIterator<Item = &'a TypeRecord>) -> Self {
        let records: Vec<&'a TypeRecord> = records.into_iter().collect();
        let mut by_full_name = HashMap::with_capacity(records.len());
        for rec in &records {
            by_full_name.entry(rec.full_name.as_str()).or_insert(*rec);
        }
        Self {
            records,
            by_full_name,
        }
    }

    /// Resolve a declared name using the three-tier rule.
    pub fn resolve(&self, declared: &str) -> Option<&'a TypeRecord> {
        let declared = declared.trim();
        if declared.is_empty() {
            return None;
        }
        if let Some(rec) = self.by_full_name.get(declared) {
            return Some(*rec);
        }
        if let Some(rec) = self.records.iter().find(|r| r.name == declared) {
            return Some(*rec);
        }
        self.records
            .iter()
            .find(|r| is_dotted_suffix(&r.full_name, declared))
            .copied()
    }

    pub fn records(&self) -> &[&'a TypeRecord] {
        &self.records
    }
}

/// `full` ends with `.` + `suffix`.
fn is_dotted_suffix(full: &str, suffix: &str) -> bool {
    full.len() > suffix.len()
        && full.ends_with(suffix)
        && full.as_bytes()[full.len() - suffix.len() - 1] == b'.'
}

/// Does a declared base/interface name refer to `candidate`?
///
/// Used by the descendant walk: a type is a child of `candidate` when one of
/// its declared supertypes matches. Accepts the simple name, the full name,
/// or any dotted spelling ending in `.name`, whatever its namespace (see the
/// module docs for the resulting ambiguity).
pub fn type_matches(declared: &str, candidate: &TypeRecord) -> bool {
    let declared = declared.trim();
    declared == candidate.name
        || declared == candidate.full_name
        || is_dotted_suffix(declared, &candidate.name)
}

/// All extracted types of one analysis run, keyed by full name.
#[derive(Debug, Clone, Default)]
pub struct TypeUniverse {
    records: Vec<TypeRecord>,
}

impl TypeUniverse {
    /// Build a universe, keeping the first record for every full name.
    ///
    /// Duplicates show up for `partial` types split over several files; when
    /// both declarations are `partial` their supertypes, modifiers and members
    /// are merged into the surviving record. Any other duplicate is dropped
    /// with a warning.
    pub fn from_records(records: impl IntoIterator<Item = TypeRecord>) -> Self {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut kept: Vec<TypeRecord> = Vec::new();

        for rec in records {
            match index.get(&rec.full_name) {
                Some(&i) => {
                    let existing = &mut kept[i];
                    if existing.has_modifier("partial") && rec.has_modifier("partial") {
                        debug!(
                            full_name = %rec.full_name,
                            source = ?rec.source,
                            "merging partial declaration"
                        );
                        merge_partial(existing, rec);
                    } else {
                        warn!(
                            full_name = %rec.full_name,
                            source = ?rec.source,
                            "duplicate type declaration ignored"
                        );
                    }
                }
                None => {
                    index.insert(rec.full_name.clone(), kept.len());
                    kept.push(rec);
                }
            }
        }

        Self { records: kept }
    }

    pub fn records(&self) -> &[TypeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.records.iter())
    }

    /// Resolve a name against the whole universe.
    pub fn resolve(&self, declared: &str) -> Option<&TypeRecord> {
        self.resolver().resolve(declared)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeRecord> {
        self.records.iter()
    }
}

impl FromIterator<TypeRecord> for TypeUniverse {
    fn from_iter<I: IntoIterator<Item = TypeRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}

fn merge_partial(existing: &mut TypeRecord, other: TypeRecord) {
    for base in other.base_types {
        if !existing.base_types.contains(&base) {
            existing.base_types.push(base);
        }
    }
    for iface in other.interfaces {
        if !existing.interfaces.contains(&iface) {
            existing.interfaces.push(iface);
        }
    }
    for modifier in other.modifiers {
        if !existing.modifiers.contains(&modifier) {
            existing.modifiers.push(modifier);
        }
    }
    existing.members.extend(other.members);
}
