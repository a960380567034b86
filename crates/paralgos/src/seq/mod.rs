//! Sequential graph algorithms run inside work units.
//!
//! Everything here is single-threaded and read-only over the graph; the
//! parallel entry points decide which slice of the work each call covers.

pub mod brandes;
pub mod flow;
pub mod paths;
pub mod structure;

pub use flow::AuxiliaryNetwork;
pub use paths::{bellman_ford, bfs, dijkstra, PathTree};
