//! Dependency graph nodes.

use rustc_hash::FxHashSet as HashSet;

use super::{ModDeclare, ModId};

/// One mod inside the dependency graph: its declaration plus resolved edges.
///
/// Edge sets are id-keyed rather than pointer-keyed; the owning
/// [`DependencyGraph`](crate::DependencyGraph) guarantees that every id in
/// every set refers to a node currently present in the graph.
///
/// - `necessary_depend_on`: the subset of declared required dependencies that
///   currently resolve to a live node.
/// - `depend_on`: `necessary_depend_on` plus resolved optional dependencies.
/// - `depend_by`: reverse index, the exact inverse of `depend_on` across the
///   whole graph.
/// - `waived_depend_on`: declared required ids whose edge was removed by the
///   cycle resolver; they count as satisfied without a live edge.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    declare: ModDeclare,
    pub(crate) necessary_depend_on: HashSet<ModId>,
    pub(crate) depend_on: HashSet<ModId>,
    pub(crate) depend_by: HashSet<ModId>,
    pub(crate) waived_depend_on: HashSet<ModId>,
}

impl DependencyNode {
    pub(crate) fn new(declare: ModDeclare) -> Self {
        Self {
            declare,
            necessary_depend_on: HashSet::default(),
            depend_on: HashSet::default(),
            depend_by: HashSet::default(),
            waived_depend_on: HashSet::default(),
        }
    }

    /// The declaration this node was built from.
    pub fn declare(&self) -> &ModDeclare {
        &self.declare
    }

    /// The mod id.
    pub fn id(&self) -> &ModId {
        &self.declare.id
    }

    /// Resolved required dependencies.
    pub fn necessary_depend_on(&self) -> &HashSet<ModId> {
        &self.necessary_depend_on
    }

    /// All resolved dependencies, required and optional.
    pub fn depend_on(&self) -> &HashSet<ModId> {
        &self.depend_on
    }

    /// Mods that depend on this one (required or optional).
    pub fn depend_by(&self) -> &HashSet<ModId> {
        &self.depend_by
    }

    /// Required ids released by cycle breaking.
    pub fn waived_depend_on(&self) -> &HashSet<ModId> {
        &self.waived_depend_on
    }

    /// True once every declared required dependency either resolves to a live
    /// node or has been waived by cycle breaking.
    pub fn is_satisfied(&self) -> bool {
        self.necessary_depend_on.len() + self.waived_depend_on.len()
            >= self.declare.dependencies.len()
    }

    /// Declared required ids that do not currently resolve, in manifest order.
    ///
    /// A repeated entry in the declared list can only ever be matched once,
    /// so every repetition past the first is reported as unresolved.
    pub fn unresolved_dependencies(&self) -> Vec<ModId> {
        let mut seen: HashSet<&ModId> = HashSet::default();
        self.declare
            .dependencies
            .iter()
            .filter(|dep| {
                let first = seen.insert(*dep);
                !(first
                    && (self.necessary_depend_on.contains(*dep)
                        || self.waived_depend_on.contains(*dep)))
            })
            .cloned()
            .collect()
    }

    /// `depend_on` in lexicographic order, for deterministic traversal.
    pub(crate) fn depend_on_sorted(&self) -> Vec<ModId> {
        let mut ids: Vec<ModId> = self.depend_on.iter().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// `depend_by` in lexicographic order, for deterministic traversal.
    pub(crate) fn depend_by_sorted(&self) -> Vec<ModId> {
        let mut ids: Vec<ModId> = self.depend_by.iter().cloned().collect();
        ids.sort_unstable();
        ids
    }
}
