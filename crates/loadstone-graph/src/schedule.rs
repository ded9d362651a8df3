//! Load-order computation over a validated, acyclic graph.

use std::collections::VecDeque;

use rustc_hash::FxHashMap as HashMap;

use super::graph::DependencyGraph;
use super::{Error, ModId, Result};

impl DependencyGraph {
    /// Compute the deterministic mod order via Kahn's algorithm over the
    /// dependent direction.
    ///
    /// A mod's indegree is the number of live mods depending on it, so the
    /// queue starts with mods nothing depends on and every mod appears
    /// *before* everything it depends on. Callers that want
    /// dependencies-first initialization iterate the result in reverse. The
    /// queue is seeded and drained in lexicographic order, so equal inputs
    /// always produce identical output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedCycle`] if fewer mods were ordered than are
    /// live in the graph. After [`resolve_cycles`](Self::resolve_cycles) this
    /// indicates an internal invariant violation and must not be treated as a
    /// partial result.
    pub fn schedule(&self) -> Result<Vec<ModId>> {
        let ids = self.ids_sorted();
        let mut indegree: HashMap<ModId, usize> = HashMap::default();
        let mut queue: VecDeque<ModId> = VecDeque::new();

        for id in &ids {
            let count = self.get(id).map_or(0, |node| node.depend_by().len());
            indegree.insert(id.clone(), count);
            if count == 0 {
                queue.push_back(id.clone());
            }
        }

        let mut order: Vec<ModId> = Vec::with_capacity(ids.len());
        while let Some(id) = queue.pop_front() {
            if let Some(node) = self.get(&id) {
                for dep in node.depend_on_sorted() {
                    if let Some(count) = indegree.get_mut(&dep) {
                        *count -= 1;
                        if *count == 0 {
                            queue.push_back(dep);
                        }
                    }
                }
            }
            order.push(id);
        }

        if order.len() != ids.len() {
            return Err(Error::UnresolvedCycle {
                scheduled: order.len(),
                total: ids.len(),
            });
        }
        tracing::debug!(mods = order.len(), "load order computed");
        Ok(order)
    }
}
