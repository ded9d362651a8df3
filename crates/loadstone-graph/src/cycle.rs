//! Cycle detection and deterministic cycle breaking.
//!
//! A topological order must exist before scheduling, so every cycle in the
//! resolved dependency relation has to be eliminated first. Optional edges
//! inside a cycle are sacrificed before required ones; when a cycle consists
//! purely of required edges, a deterministic greedy feedback-edge heuristic
//! picks which edge to drop. Edges are always preferred over whole nodes: a
//! feedback edge set always exists, and removing edges keeps every mod
//! loadable.

use rustc_hash::FxHashMap as HashMap;
use rustc_hash::FxHashSet as HashSet;

use super::graph::DependencyGraph;
use super::{Diagnostic, ModId};

impl DependencyGraph {
    /// Break every dependency cycle, reporting each removed edge.
    ///
    /// Two phases, both deterministic (ties broken lexicographically):
    ///
    /// 1. Strongly connected components of the full `depend_on` relation are
    ///    computed; every optional edge between members of a non-trivial
    ///    component is removed. An edge whose endpoints share a component
    ///    always lies on some cycle, and dropping an optional edge never
    ///    violates a requirement.
    /// 2. Components are recomputed over `necessary_depend_on` only. While a
    ///    non-trivial component remains, the required edge with the highest
    ///    in-component degree score is removed (ties: later source id, then
    ///    later target id). For a pure two-cycle `a ⇄ b` this removes
    ///    `b -> a`.
    ///
    /// Post-condition: the `necessary_depend_on` subgraph (and the whole
    /// `depend_on` relation) is acyclic. Nodes are never removed here, and
    /// every removed required edge is recorded as a waived requirement on its
    /// source node, so a later [`validate`](DependencyGraph::validate) pass
    /// finds nothing to evict.
    pub fn resolve_cycles(&mut self, diagnostics: &mut Vec<Diagnostic>) {
        self.break_optional_cycle_edges(diagnostics);
        self.break_required_cycle_edges(diagnostics);
    }

    /// Phase 1: drop optional edges inside non-trivial components of the
    /// full `depend_on` relation.
    fn break_optional_cycle_edges(&mut self, diagnostics: &mut Vec<Diagnostic>) {
        let components = self.components(|node_id| {
            self.get(node_id)
                .map(|n| n.depend_on_sorted())
                .unwrap_or_default()
        });

        for component in components {
            if !self.component_is_cyclic(&component, false) {
                continue;
            }
            let members: HashSet<ModId> = component.iter().cloned().collect();
            for from in &component {
                let Some(node) = self.get(from) else { continue };
                let optional_targets: Vec<ModId> = node
                    .depend_on_sorted()
                    .into_iter()
                    .filter(|to| members.contains(to) && !node.necessary_depend_on().contains(to))
                    .collect();
                for to in optional_targets {
                    self.unwire_edge(from, &to);
                    tracing::warn!(
                        from = %from,
                        to = %to,
                        "removed optional dependency to break cycle"
                    );
                    diagnostics.push(Diagnostic::CycleBroken {
                        from: from.clone(),
                        to,
                        optional: true,
                        cycle: component.clone(),
                    });
                }
            }
        }
    }

    /// Phase 2: greedy feedback-edge removal over required edges.
    fn break_required_cycle_edges(&mut self, diagnostics: &mut Vec<Diagnostic>) {
        loop {
            let components = self.components(|node_id| {
                self.get(node_id)
                    .map(|n| {
                        let mut ids: Vec<ModId> = n
                            .necessary_depend_on()
                            .iter()
                            .cloned()
                            .collect();
                        ids.sort_unstable();
                        ids
                    })
                    .unwrap_or_default()
            });

            let Some(component) = components
                .into_iter()
                .find(|c| self.component_is_cyclic(c, true))
            else {
                return;
            };

            let Some((from, to)) = self.pick_feedback_edge(&component) else {
                return;
            };
            self.waive_requirement(&from, &to);
            tracing::warn!(
                from = %from,
                to = %to,
                "removed required dependency to break cycle"
            );
            diagnostics.push(Diagnostic::CycleBroken {
                from,
                to,
                optional: false,
                cycle: component,
            });
        }
    }

    /// Choose the required edge to sacrifice inside one cyclic component.
    ///
    /// Score of an edge `u -> v` is the summed in-component degree of its
    /// endpoints; the highest score wins, ties go to the lexicographically
    /// later source id, then the later target id.
    fn pick_feedback_edge(&self, component: &[ModId]) -> Option<(ModId, ModId)> {
        let members: HashSet<ModId> = component.iter().cloned().collect();
        let mut degree: HashMap<ModId, usize> = HashMap::default();
        let mut edges: Vec<(ModId, ModId)> = Vec::new();

        for from in component {
            let node = self.get(from)?;
            for to in node.necessary_depend_on() {
                if members.contains(to) {
                    *degree.entry(from.clone()).or_default() += 1;
                    *degree.entry(to.clone()).or_default() += 1;
                    edges.push((from.clone(), to.clone()));
                }
            }
        }

        edges.into_iter().max_by(|(a_from, a_to), (b_from, b_to)| {
            let a_score = degree[a_from] + degree[a_to];
            let b_score = degree[b_from] + degree[b_to];
            a_score
                .cmp(&b_score)
                .then_with(|| a_from.cmp(b_from))
                .then_with(|| a_to.cmp(b_to))
        })
    }

    /// True if the component still contains a cycle: more than one member,
    /// or a single member with a self edge.
    fn component_is_cyclic(&self, component: &[ModId], required_only: bool) -> bool {
        match component {
            [] => false,
            [only] => self.get(only).is_some_and(|node| {
                if required_only {
                    node.necessary_depend_on().contains(only)
                } else {
                    node.depend_on().contains(only)
                }
            }),
            _ => true,
        }
    }

    /// Strongly connected components via iterative Tarjan.
    ///
    /// Roots and successors are visited in lexicographic order and each
    /// component is returned with sorted members, components ordered by their
    /// smallest member, so the output is fully deterministic.
    fn components<F>(&self, successors: F) -> Vec<Vec<ModId>>
    where
        F: Fn(&ModId) -> Vec<ModId>,
    {
        let ids = self.ids_sorted();
        let index_of: HashMap<ModId, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let succ: Vec<Vec<usize>> = ids
            .iter()
            .map(|id| {
                successors(id)
                    .into_iter()
                    .filter_map(|s| index_of.get(&s).copied())
                    .collect()
            })
            .collect();

        let n = ids.len();
        let mut visit_index: Vec<Option<usize>> = vec![None; n];
        let mut lowlink: Vec<usize> = vec![0; n];
        let mut on_stack: Vec<bool> = vec![false; n];
        let mut stack: Vec<usize> = Vec::new();
        let mut counter = 0usize;
        let mut result: Vec<Vec<ModId>> = Vec::new();

        // (vertex, next successor position) frames for the explicit DFS.
        let mut frames: Vec<(usize, usize)> = Vec::new();

        for root in 0..n {
            if visit_index[root].is_some() {
                continue;
            }
            frames.push((root, 0));

            while let Some(&mut (v, ref mut child)) = frames.last_mut() {
                if *child == 0 {
                    visit_index[v] = Some(counter);
                    lowlink[v] = counter;
                    counter += 1;
                    stack.push(v);
                    on_stack[v] = true;
                }

                if let Some(&w) = succ[v].get(*child) {
                    *child += 1;
                    if visit_index[w].is_none() {
                        frames.push((w, 0));
                    } else if on_stack[w] {
                        lowlink[v] = lowlink[v].min(visit_index[w].unwrap_or(usize::MAX));
                    }
                    continue;
                }

                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[v]);
                }
                if visit_index[v] == Some(lowlink[v]) {
                    let mut component = Vec::new();
                    while let Some(w) = stack.pop() {
                        on_stack[w] = false;
                        component.push(ids[w].clone());
                        if w == v {
                            break;
                        }
                    }
                    component.sort_unstable();
                    result.push(component);
                }
            }
        }

        result.sort_unstable_by(|a, b| a.first().cmp(&b.first()));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModDeclare;

    fn build(declares: Vec<ModDeclare>) -> DependencyGraph {
        let mut diagnostics = Vec::new();
        DependencyGraph::build(declares, &mut diagnostics).expect("build")
    }

    fn necessary_is_acyclic(graph: &DependencyGraph) -> bool {
        // Kahn count over required edges only.
        let ids = graph.ids_sorted();
        let mut indegree: HashMap<ModId, usize> = ids.iter().map(|id| (id.clone(), 0)).collect();
        for id in &ids {
            for dep in graph.get(id).expect("node").necessary_depend_on() {
                *indegree.get_mut(dep).expect("live") += 1;
            }
        }
        let mut queue: Vec<ModId> = ids
            .iter()
            .filter(|id| indegree[*id] == 0)
            .cloned()
            .collect();
        let mut seen = 0;
        while let Some(id) = queue.pop() {
            seen += 1;
            for dep in graph.get(&id).expect("node").necessary_depend_on() {
                let count = indegree.get_mut(dep).expect("live");
                *count -= 1;
                if *count == 0 {
                    queue.push(dep.clone());
                }
            }
        }
        seen == ids.len()
    }

    #[test]
    fn test_two_mod_required_cycle_drops_later_source_edge() {
        let mut graph = build(vec![
            ModDeclare::builder("a").dependencies(["b"]).build(),
            ModDeclare::builder("b").dependencies(["a"]).build(),
        ]);
        let mut diagnostics = Vec::new();
        graph.resolve_cycles(&mut diagnostics);

        assert_eq!(
            diagnostics,
            vec![Diagnostic::CycleBroken {
                from: ModId::new("b"),
                to: ModId::new("a"),
                optional: false,
                cycle: vec![ModId::new("a"), ModId::new("b")],
            }]
        );
        assert_eq!(graph.len(), 2);
        assert!(necessary_is_acyclic(&graph));
        assert!(graph.edges_are_consistent());
    }

    #[test]
    fn test_optional_edge_is_sacrificed_before_required() {
        // a requires b, b optionally depends on a: dropping the optional
        // edge must be enough.
        let mut graph = build(vec![
            ModDeclare::builder("a").dependencies(["b"]).build(),
            ModDeclare::builder("b").optional_dependencies(["a"]).build(),
        ]);
        let mut diagnostics = Vec::new();
        graph.resolve_cycles(&mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            &diagnostics[0],
            Diagnostic::CycleBroken { optional: true, from, to, .. }
                if from.as_str() == "b" && to.as_str() == "a"
        ));
        // The required edge a -> b survives.
        assert!(
            graph
                .get(&ModId::new("a"))
                .expect("a")
                .necessary_depend_on()
                .contains(&ModId::new("b"))
        );
        assert!(graph.edges_are_consistent());
    }

    #[test]
    fn test_three_mod_required_cycle_is_linearized() {
        let mut graph = build(vec![
            ModDeclare::builder("a").dependencies(["b"]).build(),
            ModDeclare::builder("b").dependencies(["c"]).build(),
            ModDeclare::builder("c").dependencies(["a"]).build(),
        ]);
        let mut diagnostics = Vec::new();
        graph.resolve_cycles(&mut diagnostics);

        // One removal suffices for a simple ring.
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(graph.len(), 3);
        assert!(necessary_is_acyclic(&graph));
    }

    #[test]
    fn test_self_dependency_is_broken() {
        let mut graph = build(vec![
            ModDeclare::builder("narcissus")
                .dependencies(["narcissus"])
                .build(),
        ]);
        let mut diagnostics = Vec::new();
        graph.resolve_cycles(&mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert!(necessary_is_acyclic(&graph));
        assert!(graph.edges_are_consistent());
    }

    #[test]
    fn test_acyclic_graph_is_untouched() {
        let mut graph = build(vec![
            ModDeclare::builder("a").dependencies(["b"]).build(),
            ModDeclare::builder("b").optional_dependencies(["c"]).build(),
            ModDeclare::new("c"),
        ]);
        let mut diagnostics = Vec::new();
        graph.resolve_cycles(&mut diagnostics);

        assert!(diagnostics.is_empty());
        assert!(
            graph
                .get(&ModId::new("b"))
                .expect("b")
                .depend_on()
                .contains(&ModId::new("c"))
        );
    }

    #[test]
    fn test_revalidation_after_cycle_break_is_a_no_op() {
        let mut graph = build(vec![
            ModDeclare::builder("a").dependencies(["b"]).build(),
            ModDeclare::builder("b").dependencies(["a"]).build(),
        ]);
        let mut diagnostics = Vec::new();
        graph.resolve_cycles(&mut diagnostics);

        // b's requirement on a was waived, not lost; another validation pass
        // must keep both survivors and stay silent.
        diagnostics.clear();
        graph.validate(&mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(graph.len(), 2);
        assert!(
            graph
                .get(&ModId::new("b"))
                .expect("b")
                .waived_depend_on()
                .contains(&ModId::new("a"))
        );
        assert!(graph.edges_are_consistent());
    }

    #[test]
    fn test_disjoint_cycles_are_each_broken() {
        let mut graph = build(vec![
            ModDeclare::builder("a").dependencies(["b"]).build(),
            ModDeclare::builder("b").dependencies(["a"]).build(),
            ModDeclare::builder("x").dependencies(["y"]).build(),
            ModDeclare::builder("y").dependencies(["x"]).build(),
        ]);
        let mut diagnostics = Vec::new();
        graph.resolve_cycles(&mut diagnostics);

        assert_eq!(diagnostics.len(), 2);
        assert!(necessary_is_acyclic(&graph));
    }
}
