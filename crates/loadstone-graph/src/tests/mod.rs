//! In-crate test suites for loadstone-graph.
