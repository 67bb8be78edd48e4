//! Graph traversal engine: the subgraph reachable around a target type.
//!
//! Both walks are breadth-first over an explicit worklist of
//! `(type, remaining_depth)` pairs with a visited set owned by the walk, so
//! there is no recursion and termination holds on cyclic declarations:
//!
//! - Ancestor walk: follows resolved base types (and interfaces when enabled).
//! - Descendant walk: finds every other type declaring the current one as a
//!   base type (or interface when enabled).
//!
//! Each walk keeps its own visited set, so with [`Direction::Both`] depth is
//! consumed independently per direction and the result is exactly the union
//! of an `Up` run and a `Down` run. Because the queue is breadth-first, a
//! type is expanded at its shortest hop distance from the target.
//!
//! Performance characteristics:
//! - Ancestor walk: O(|V| + |E|) resolutions
//! - Descendant walk: O(|V| · |reached|) candidate checks (no reverse index)

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::error::{HierError, HierResult};
use crate::model::{AnalysisResult, TraversalOptions, TypeRecord};
use crate::relations::build_relationships;
use crate::universe::{type_matches, Resolver, TypeUniverse};

/// Upper bound on node expansions per walk.
pub const MAX_EXPANSIONS: usize = 100_000;

/// Ordered, duplicate-free collection of reached types.
struct Reached<'a> {
    order: Vec<&'a TypeRecord>,
    seen: HashSet<&'a str>,
}

impl<'a> Reached<'a> {
    fn new(target: &'a TypeRecord) -> Self {
        let mut seen = HashSet::new();
        seen.insert(target.full_name.as_str());
        Self {
            order: vec![target],
            seen,
        }
    }

    fn insert(&mut self, rec: &'a TypeRecord) -> bool {
        if self.seen.insert(rec.full_name.as_str()) {
            self.order.push(rec);
            true
        } else {
            false
        }
    }
}

/// Compute the subgraph around `options.target_identifier`.
///
/// # Errors
/// - [`HierError::InvalidArgument`] if the options fail validation
/// - [`HierError::TargetNotFound`] if the target resolves to nothing
pub fn analyze(universe: &TypeUniverse, options: &TraversalOptions) -> HierResult<AnalysisResult> {
    analyze_with_limit(universe, options, MAX_EXPANSIONS)
}

/// [`analyze`] with an explicit cap on node expansions per walk.
pub(crate) fn analyze_with_limit(
    universe: &TypeUniverse,
    options: &TraversalOptions,
    limit: usize,
) -> HierResult<AnalysisResult> {
    options.validate()?;

    let resolver = universe.resolver();
    let target = resolver
        .resolve(&options.target_identifier)
        .ok_or_else(|| HierError::target_not_found(&options.target_identifier))?;

    debug!(
        target = %target.full_name,
        direction = %options.direction,
        max_depth = options.max_depth,
        include_interfaces = options.include_interfaces,
        "starting traversal"
    );

    let mut reached = Reached::new(target);

    if options.direction.walks_up() {
        walk_ancestors(&resolver, target, options, limit, &mut reached);
    }
    if options.direction.walks_down() {
        walk_descendants(universe, target, options, limit, &mut reached);
    }

    let relationships = build_relationships(reached.order.iter().copied(), options.include_interfaces);

    debug!(
        types = reached.order.len(),
        relationships = relationships.len(),
        "traversal finished"
    );

    Ok(AnalysisResult {
        query: options.target_identifier.clone(),
        options: options.clone(),
        target_type: target.full_name.clone(),
        types: reached.order.into_iter().cloned().collect(),
        relationships,
    })
}

/// Follow declared supertypes outward from `target`.
fn walk_ancestors<'a>(
    resolver: &Resolver<'a>,
    target: &'a TypeRecord,
    options: &TraversalOptions,
    limit: usize,
    reached: &mut Reached<'a>,
) {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&'a TypeRecord, usize)> = VecDeque::new();
    queue.push_back((target, options.max_depth));
    let mut expansions = 0usize;

    while let Some((current, remaining)) = queue.pop_front() {
        if remaining == 0 || !visited.insert(current.full_name.as_str()) {
            continue;
        }
        expansions += 1;
        if expansions > limit {
            warn!(limit, "ancestor walk hit expansion limit, result is partial");
            break;
        }

        for (declared, _) in current.declared_supertypes(options.include_interfaces) {
            if options.is_excluded(declared) {
                continue;
            }
            let Some(parent) = resolver.resolve(declared) else {
                continue;
            };
            if is_filtered(parent, target, options) {
                continue;
            }
            reached.insert(parent);
            queue.push_back((parent, remaining - 1));
        }
    }
}

/// Find types that declare the current type as a supertype, outward from `target`.
fn walk_descendants<'a>(
    universe: &'a TypeUniverse,
    target: &'a TypeRecord,
    options: &TraversalOptions,
    limit: usize,
    reached: &mut Reached<'a>,
) {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&'a TypeRecord, usize)> = VecDeque::new();
    queue.push_back((target, options.max_depth));
    let mut expansions = 0usize;

    while let Some((current, remaining)) = queue.pop_front() {
        if remaining == 0 || !visited.insert(current.full_name.as_str()) {
            continue;
        }
        expansions += 1;
        if expansions > limit {
            warn!(limit, "descendant walk hit expansion limit, result is partial");
            break;
        }

        for candidate in universe.iter() {
            if candidate.full_name == current.full_name {
                continue;
            }
            if !declares_supertype(candidate, current, options.include_interfaces) {
                continue;
            }
            if is_filtered(candidate, target, options) {
                continue;
            }
            reached.insert(candidate);
            queue.push_back((candidate, remaining - 1));
        }
    }
}

fn declares_supertype(candidate: &TypeRecord, parent: &TypeRecord, include_interfaces: bool) -> bool {
    candidate
        .declared_supertypes(include_interfaces)
        .any(|(declared, _)| type_matches(declared, parent))
}

/// Exclusion check at discovery time. The target is never filtered.
fn is_filtered(candidate: &TypeRecord, target: &TypeRecord, options: &TraversalOptions) -> bool {
    candidate.full_name != target.full_name
        && (options.is_excluded(&candidate.name) || options.is_excluded(&candidate.full_name))
}
