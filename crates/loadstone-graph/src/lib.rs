//! # loadstone-graph
//!
//! Pure graph data structures for mod dependency resolution.
//!
//! This crate takes the manifests of a mod set, each declaring required,
//! optional and mutually-exclusive relationships, and turns them into a
//! validated dependency graph plus a deterministic load order. It contains no
//! I/O: manifest discovery and parsing, as well as diagnostic presentation,
//! belong to the surrounding mod loader.
//!
//! ## Overview
//!
//! - **Declarations in, order out**: [`resolve`] runs the whole pipeline and
//!   returns the surviving graph, the order, and a diagnostic stream.
//! - **Degrade, don't abort**: a mod with unsatisfiable requirements is
//!   evicted (cascading through its required dependents); a dependency cycle
//!   is cut by removing a deterministic minimum of edges. A single bad mod
//!   never sinks the rest of the set.
//! - **Deterministic**: every tie-break is lexicographic on mod ids, so the
//!   same declaration set always produces the same order and the same
//!   diagnostics.
//!
//! ## Architecture
//!
//! ```text
//! ModDeclare set
//!      │
//!      ▼
//! DependencyGraph::build ──► validate (fixed point) ──► resolve_cycles
//!                                                             │
//!                                                             ▼
//!                              Resolution ◄────────────── schedule
//!                     (graph + order + diagnostics)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use loadstone_graph::{ModDeclare, resolve};
//!
//! # fn main() -> loadstone_graph::Result<()> {
//! let resolution = resolve(vec![
//!     ModDeclare::builder("worldgen.extras")
//!         .dependencies(["core.api"])
//!         .build(),
//!     ModDeclare::new("core.api"),
//! ])?;
//!
//! // Every mod appears before the mods it depends on.
//! assert_eq!(resolution.order[0].as_str(), "worldgen.extras");
//! assert!(resolution.diagnostics.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Incremental append
//!
//! An already-resolved graph accepts late arrivals through
//! [`DependencyGraph::try_append`]: the new mod is admitted only if none of
//! its declared incompatibilities are live and all of its required
//! dependencies are, and a rejected append leaves the graph untouched.
//!
//! ## Concurrency
//!
//! The graph is a plain owned value mutated through `&mut self`. Nothing here
//! is thread-safe; callers needing shared access must bring their own
//! synchronization.

pub mod declare;
pub mod diagnostic;
pub mod graph;
pub mod mod_id;
pub mod node;
pub mod resolve;

// These only add impl blocks to `DependencyGraph`.
mod cycle;
mod schedule;
mod validate;

pub use declare::{ModDeclare, ModDeclareBuilder};
pub use diagnostic::Diagnostic;
pub use graph::{AppendRejection, DependencyGraph};
pub use mod_id::ModId;
pub use node::DependencyNode;
pub use resolve::{Resolution, resolve};

/// Error types for loadstone operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two declarations in one bulk build share an id.
    #[error("duplicate mod id '{0}' in declaration set")]
    DuplicateId(ModId),

    /// Scheduling covered fewer mods than are live in the graph. After cycle
    /// resolution this is an internal invariant violation, never a partial
    /// result.
    #[error("unresolved dependency cycle: scheduled {scheduled} of {total} mods")]
    UnresolvedCycle {
        /// Mods that made it into the order.
        scheduled: usize,
        /// Live mods in the graph.
        total: usize,
    },
}

/// Result type alias for loadstone operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests;
