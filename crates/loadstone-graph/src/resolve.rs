//! One-shot resolution pipeline.

use super::graph::DependencyGraph;
use super::{Diagnostic, ModDeclare, ModId, Result};

/// Outcome of resolving a full declaration set.
#[derive(Debug)]
pub struct Resolution {
    /// The validated, acyclic graph of surviving mods.
    pub graph: DependencyGraph,
    /// Deterministic mod order; every mod appears before the mods it depends
    /// on (see [`DependencyGraph::schedule`]).
    pub order: Vec<ModId>,
    /// Every recoverable problem encountered along the way.
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve a set of mod declarations end to end.
///
/// Runs the full pipeline: graph construction, validation to a fixed point,
/// cycle breaking, and scheduling. Bad mods degrade the result instead of
/// aborting it: unsatisfiable mods are evicted and cycles are cut, with one
/// diagnostic per exclusion.
///
/// # Errors
///
/// [`Error::DuplicateId`](crate::Error::DuplicateId) if two declarations
/// share an id, or [`Error::UnresolvedCycle`](crate::Error::UnresolvedCycle)
/// if scheduling comes up short after cycle resolution (an internal invariant
/// violation).
pub fn resolve<I>(declares: I) -> Result<Resolution>
where
    I: IntoIterator<Item = ModDeclare>,
{
    let mut diagnostics = Vec::new();
    let mut graph = DependencyGraph::build(declares, &mut diagnostics)?;
    graph.resolve_cycles(&mut diagnostics);
    let order = graph.schedule()?;
    Ok(Resolution {
        graph,
        order,
        diagnostics,
    })
}
