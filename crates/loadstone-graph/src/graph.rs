//! Graph storage, bulk construction and incremental append.

use rustc_hash::FxHashMap as HashMap;

use super::node::DependencyNode;
use super::{Diagnostic, Error, ModDeclare, ModId, Result};

/// Rejected incremental append, carrying every violated constraint.
///
/// A rejected append leaves the graph exactly as it was; the caller can
/// inspect `conflicts` and `missing` to report why the mod was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "cannot append mod '{mod_id}': {} incompatibilities, {} missing dependencies",
    .conflicts.len(),
    .missing.len()
)]
pub struct AppendRejection {
    /// The mod that was refused.
    pub mod_id: ModId,
    /// Live mods matched by the declaration's `incompatible_with` list.
    pub conflicts: Vec<ModId>,
    /// Declared required ids absent from the graph.
    pub missing: Vec<ModId>,
}

/// The live set of mods and their resolved dependency edges.
///
/// The graph is a plain owned value: all mutation goes through `&mut self`,
/// and nothing inside is shared or locked. Callers that need concurrent
/// access must supply their own synchronization.
///
/// Structural invariant, upheld by every operation: each id stored in any
/// node's `depend_on`/`depend_by` set refers to a node currently present in
/// the graph, and `depend_by` is the exact inverse of `depend_on`.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    nodes: HashMap<ModId, DependencyNode>,
}

impl DependencyGraph {
    /// Build a graph from a collection of declarations and validate it to a
    /// fixed point.
    ///
    /// Required ids that do not resolve are left for the validator, which
    /// evicts the declaring mod (cascading through dependents) and emits one
    /// [`Diagnostic::MissingDependency`] per missing id. Optional ids that do
    /// not resolve are silently ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if two declarations share an id; this
    /// is fatal to the whole bulk build.
    pub fn build<I>(declares: I, diagnostics: &mut Vec<Diagnostic>) -> Result<Self>
    where
        I: IntoIterator<Item = ModDeclare>,
    {
        let mut nodes: HashMap<ModId, DependencyNode> = HashMap::default();
        for declare in declares {
            let id = declare.id.clone();
            if nodes.insert(id.clone(), DependencyNode::new(declare)).is_some() {
                return Err(Error::DuplicateId(id));
            }
        }

        let mut graph = Self { nodes };

        // Wire edges in a second pass, once the full node set exists.
        let ids: Vec<ModId> = graph.nodes.keys().cloned().collect();
        for id in ids {
            let declare = graph.nodes[&id].declare().clone();

            for dependency in &declare.dependencies {
                if graph.nodes.contains_key(dependency) {
                    graph.wire_edge(&id, dependency, true);
                }
            }
            for optional in &declare.optional_dependencies {
                if graph.nodes.contains_key(optional) {
                    graph.wire_edge(&id, optional, false);
                }
            }
        }

        tracing::debug!(mods = graph.len(), "dependency graph assembled");
        graph.validate(diagnostics);
        Ok(graph)
    }

    /// Append one declaration to an already-validated graph.
    ///
    /// The append is all-or-nothing: every `incompatible_with` match against
    /// a live mod (including a live mod that already uses the appended id)
    /// and every missing required id is collected first, and if
    /// any constraint is violated the graph is left untouched and the full
    /// set of violations is returned. On success the new node is wired into
    /// the graph and returned.
    ///
    /// Each violation is also pushed into `diagnostics`.
    pub fn try_append(
        &mut self,
        declare: ModDeclare,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> std::result::Result<&DependencyNode, AppendRejection> {
        let mut conflicts: Vec<ModId> = Vec::new();
        // A live mod with the same id is a conflict in itself: two mods
        // cannot share an id.
        if self.nodes.contains_key(&declare.id) {
            conflicts.push(declare.id.clone());
        }
        for incompatible in &declare.incompatible_with {
            if self.nodes.contains_key(incompatible) {
                conflicts.push(incompatible.clone());
            }
        }
        conflicts.sort_unstable();
        conflicts.dedup();

        let mut missing: Vec<ModId> = Vec::new();
        for dependency in &declare.dependencies {
            if !self.nodes.contains_key(dependency) {
                missing.push(dependency.clone());
            }
        }

        if !conflicts.is_empty() || !missing.is_empty() {
            for conflicting in &conflicts {
                tracing::warn!(
                    mod_id = %declare.id,
                    conflicting = %conflicting,
                    "append rejected: incompatible mod present"
                );
                diagnostics.push(Diagnostic::Incompatibility {
                    mod_id: declare.id.clone(),
                    conflicting: conflicting.clone(),
                });
            }
            for missed in &missing {
                tracing::warn!(
                    mod_id = %declare.id,
                    missing = %missed,
                    "append rejected: missing required dependency"
                );
                diagnostics.push(Diagnostic::MissingDependency {
                    mod_id: declare.id.clone(),
                    missing: missed.clone(),
                });
            }
            return Err(AppendRejection {
                mod_id: declare.id,
                conflicts,
                missing,
            });
        }

        let id = declare.id.clone();
        let dependencies = declare.dependencies.clone();
        let optionals = declare.optional_dependencies.clone();
        self.nodes.insert(id.clone(), DependencyNode::new(declare));

        // All required ids were verified present above.
        for dependency in &dependencies {
            self.wire_edge(&id, dependency, true);
        }
        // Optional ids that do not currently resolve are silently skipped;
        // so is an optional self-reference, which would otherwise introduce
        // a cycle into an already-linearized graph.
        for optional in &optionals {
            if *optional != id && self.nodes.contains_key(optional) {
                self.wire_edge(&id, optional, false);
            }
        }

        tracing::debug!(mod_id = %id, "mod appended to dependency graph");
        Ok(&self.nodes[&id])
    }

    /// Look up a node by id.
    pub fn get(&self, id: &ModId) -> Option<&DependencyNode> {
        self.nodes.get(id)
    }

    /// True if a mod with this id is live in the graph.
    pub fn contains(&self, id: &ModId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live mods.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no mods.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all live nodes (unordered).
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.values()
    }

    /// All live ids in lexicographic order.
    pub fn ids_sorted(&self) -> Vec<ModId> {
        let mut ids: Vec<ModId> = self.nodes.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Verify that `depend_by` is the exact inverse of `depend_on` and that
    /// no edge references an id absent from the graph.
    ///
    /// Cheap enough to run after every operation in tests.
    pub fn edges_are_consistent(&self) -> bool {
        for node in self.nodes.values() {
            for dep in &node.depend_on {
                let Some(target) = self.nodes.get(dep) else {
                    return false;
                };
                if !target.depend_by.contains(node.id()) {
                    return false;
                }
            }
            for by in &node.depend_by {
                let Some(source) = self.nodes.get(by) else {
                    return false;
                };
                if !source.depend_on.contains(node.id()) {
                    return false;
                }
            }
            if !node.necessary_depend_on.is_subset(&node.depend_on) {
                return false;
            }
            if !node.necessary_depend_on.is_disjoint(&node.waived_depend_on) {
                return false;
            }
        }
        true
    }

    /// Add an edge `from -> to`, updating forward and reverse sets.
    ///
    /// Required edges additionally land in `necessary_depend_on`. Both ids
    /// must be present in the graph.
    pub(crate) fn wire_edge(&mut self, from: &ModId, to: &ModId, required: bool) {
        if let Some(node) = self.nodes.get_mut(from) {
            if required {
                node.necessary_depend_on.insert(to.clone());
            }
            node.depend_on.insert(to.clone());
        }
        if let Some(target) = self.nodes.get_mut(to) {
            target.depend_by.insert(from.clone());
        }
    }

    /// Remove a required edge `from -> to` and record `to` as a waived
    /// requirement of `from`.
    ///
    /// Waiving keeps the node satisfied without the edge, so a later
    /// validation pass does not evict it for a requirement the cycle resolver
    /// deliberately released.
    pub(crate) fn waive_requirement(&mut self, from: &ModId, to: &ModId) {
        self.unwire_edge(from, to);
        if let Some(node) = self.nodes.get_mut(from) {
            node.waived_depend_on.insert(to.clone());
        }
    }

    /// Remove an edge `from -> to` from every set it participates in.
    pub(crate) fn unwire_edge(&mut self, from: &ModId, to: &ModId) {
        if let Some(node) = self.nodes.get_mut(from) {
            node.necessary_depend_on.remove(to);
            node.depend_on.remove(to);
        }
        if let Some(target) = self.nodes.get_mut(to) {
            target.depend_by.remove(from);
        }
    }

    /// Remove a node and strip its id from every other node's edge sets.
    ///
    /// Returns the detached node so callers can walk its former neighbors.
    pub(crate) fn detach(&mut self, id: &ModId) -> Option<DependencyNode> {
        let node = self.nodes.remove(id)?;
        for dep in &node.depend_on {
            if let Some(target) = self.nodes.get_mut(dep) {
                target.depend_by.remove(id);
            }
        }
        for by in &node.depend_by {
            if let Some(source) = self.nodes.get_mut(by) {
                source.necessary_depend_on.remove(id);
                source.depend_on.remove(id);
            }
        }
        Some(node)
    }
}
