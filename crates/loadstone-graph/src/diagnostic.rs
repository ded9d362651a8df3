//! Structured diagnostic events emitted during resolution.
//!
//! The engine never writes to a console or to disk; every recoverable problem
//! is pushed into a caller-supplied `Vec<Diagnostic>` so an external reporting
//! layer can decide how to render or persist it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ModId;

/// One recoverable problem encountered while resolving a mod set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A declared required dependency does not resolve to a live mod.
    ///
    /// Emitted once per missing id, both when the validator evicts a mod and
    /// when an incremental append is rejected.
    MissingDependency {
        /// The mod whose requirement is unsatisfied.
        mod_id: ModId,
        /// The required id that failed to resolve.
        missing: ModId,
    },
    /// A declared mutual exclusion matched a mod already in the graph.
    Incompatibility {
        /// The mod being appended.
        mod_id: ModId,
        /// The live mod it refuses to load alongside.
        conflicting: ModId,
    },
    /// A dependency edge was removed to break a cycle.
    CycleBroken {
        /// Source of the removed edge (the depending mod).
        from: ModId,
        /// Target of the removed edge (the dependency).
        to: ModId,
        /// True if the removed edge was an optional dependency.
        optional: bool,
        /// Members of the strongly connected component the edge belonged to,
        /// in lexicographic order.
        cycle: Vec<ModId>,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingDependency { mod_id, missing } => {
                write!(f, "mod '{mod_id}' has missing dependency '{missing}'")
            }
            Diagnostic::Incompatibility {
                mod_id,
                conflicting,
            } => {
                write!(f, "mod '{mod_id}' is incompatible with mod '{conflicting}'")
            }
            Diagnostic::CycleBroken {
                from,
                to,
                optional,
                cycle,
            } => {
                let kind = if *optional { "optional" } else { "required" };
                let members = cycle
                    .iter()
                    .map(ModId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "removed {kind} dependency '{from}' -> '{to}' to break cycle [{members}]"
                )
            }
        }
    }
}
