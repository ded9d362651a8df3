//! Fixed-point validation: eviction of mods with unsatisfiable requirements.

use std::collections::VecDeque;

use super::graph::DependencyGraph;
use super::{Diagnostic, ModId};

impl DependencyGraph {
    /// Evict every mod whose required dependencies cannot be satisfied,
    /// cascading through dependents until a fixed point is reached.
    ///
    /// Worklist algorithm over a FIFO queue:
    /// - the queue starts with every live mod (lexicographic order, so the
    ///   diagnostic stream is deterministic);
    /// - a popped id that is no longer live is stale and skipped;
    /// - a mod with fewer resolved (or cycle-waived) required edges than
    ///   declared requirements is detached from the graph, its former
    ///   dependents are re-queued, and one [`Diagnostic::MissingDependency`]
    ///   is emitted per unresolved declared entry (a repeated required id can
    ///   only be matched once, so repetitions are reported too);
    /// - a satisfied mod drops any remaining edge whose target is no longer
    ///   live (optional edges are pruned lazily, without invalidating the
    ///   mod).
    ///
    /// Post-condition: every remaining mod has all of its declared required
    /// dependencies resolved to live nodes or waived by cycle breaking, which
    /// makes validation idempotent even after
    /// [`resolve_cycles`](DependencyGraph::resolve_cycles) has run.
    pub fn validate(&mut self, diagnostics: &mut Vec<Diagnostic>) {
        let mut queue: VecDeque<ModId> = self.ids_sorted().into();

        while let Some(id) = queue.pop_front() {
            // Stale queue entry: the mod was already evicted.
            if !self.contains(&id) {
                continue;
            }

            let satisfied = self.get(&id).is_some_and(|node| node.is_satisfied());
            if satisfied {
                self.prune_dead_edges(&id);
                continue;
            }

            let Some(node) = self.detach(&id) else {
                continue;
            };
            for dependent in node.depend_by_sorted() {
                queue.push_back(dependent);
            }
            for missing in node.unresolved_dependencies() {
                tracing::warn!(
                    mod_id = %id,
                    missing = %missing,
                    "mod evicted: required dependency does not resolve"
                );
                diagnostics.push(Diagnostic::MissingDependency {
                    mod_id: id.clone(),
                    missing,
                });
            }
        }
    }

    /// Drop edges on `id` whose other endpoint is no longer live.
    ///
    /// `detach` removes edges eagerly, so this normally finds nothing; it
    /// keeps the fixed point honest if an edge ever goes stale by another
    /// path.
    fn prune_dead_edges(&mut self, id: &ModId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let dead: Vec<ModId> = node
            .depend_on()
            .iter()
            .chain(node.depend_by().iter())
            .filter(|other| !self.contains(other))
            .cloned()
            .collect();
        for other in dead {
            self.unwire_edge(id, &other);
            self.unwire_edge(&other, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModDeclare;

    fn build(declares: Vec<ModDeclare>) -> (DependencyGraph, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let graph = DependencyGraph::build(declares, &mut diagnostics).expect("build");
        (graph, diagnostics)
    }

    #[test]
    fn test_mod_with_missing_requirement_is_evicted() {
        let (graph, diagnostics) =
            build(vec![ModDeclare::builder("a").dependencies(["ghost"]).build()]);

        assert!(graph.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MissingDependency {
                mod_id: ModId::new("a"),
                missing: ModId::new("ghost"),
            }]
        );
    }

    #[test]
    fn test_eviction_cascades_through_required_chain() {
        // c -> b -> a -> ghost: all three are transitively unsatisfiable.
        let (graph, diagnostics) = build(vec![
            ModDeclare::builder("a").dependencies(["ghost"]).build(),
            ModDeclare::builder("b").dependencies(["a"]).build(),
            ModDeclare::builder("c").dependencies(["b"]).build(),
            ModDeclare::new("bystander"),
        ]);

        assert_eq!(graph.len(), 1);
        assert!(graph.contains(&ModId::new("bystander")));
        assert_eq!(diagnostics.len(), 3);
        assert!(graph.edges_are_consistent());
    }

    #[test]
    fn test_cascade_does_not_touch_optional_dependents() {
        // b optionally depends on a; a is evicted, b survives with the edge
        // pruned.
        let (graph, _) = build(vec![
            ModDeclare::builder("a").dependencies(["ghost"]).build(),
            ModDeclare::builder("b").optional_dependencies(["a"]).build(),
        ]);

        let b = graph.get(&ModId::new("b")).expect("b survives");
        assert!(b.depend_on().is_empty());
        assert!(graph.edges_are_consistent());
    }

    #[test]
    fn test_survivors_have_all_requirements_resolved() {
        let (graph, _) = build(vec![
            ModDeclare::builder("a").dependencies(["b", "ghost"]).build(),
            ModDeclare::new("b"),
            ModDeclare::builder("c").dependencies(["b"]).build(),
        ]);

        for node in graph.nodes() {
            assert_eq!(
                node.necessary_depend_on().len(),
                node.declare().dependencies.len()
            );
        }
        assert!(graph.contains(&ModId::new("c")));
        assert!(!graph.contains(&ModId::new("a")));
    }

    #[test]
    fn test_duplicate_required_entry_evicts_with_diagnostic() {
        // "b" is live, but a repeated required entry can only be matched
        // once: the mod is evicted and the repetition is named, never
        // dropped silently.
        let (graph, diagnostics) = build(vec![
            ModDeclare::builder("a").dependencies(["b", "b"]).build(),
            ModDeclare::new("b"),
        ]);

        assert!(!graph.contains(&ModId::new("a")));
        assert!(graph.contains(&ModId::new("b")));
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MissingDependency {
                mod_id: ModId::new("a"),
                missing: ModId::new("b"),
            }]
        );
    }

    #[test]
    fn test_diagnostics_name_every_unresolved_requirement() {
        let (_, diagnostics) = build(vec![
            ModDeclare::builder("a")
                .dependencies(["ghost1", "ghost2"])
                .build(),
        ]);

        let missing: Vec<&ModId> = diagnostics
            .iter()
            .map(|d| match d {
                Diagnostic::MissingDependency { missing, .. } => missing,
                other => panic!("unexpected diagnostic {other:?}"),
            })
            .collect();
        assert_eq!(missing, vec![&ModId::new("ghost1"), &ModId::new("ghost2")]);
    }
}
