//! All-pairs shortest paths, one source per item.
//!
//! Weighted variants run Dijkstra or Bellman-Ford per source and stream
//! `(source, result)` pairs lazily in node order. `johnson` precomputes
//! vertex potentials once and returns an aggregate.

mod unweighted;
mod weighted;

pub use unweighted::{all_pairs_shortest_path, all_pairs_shortest_path_length, process_bfs_chunk};
pub use weighted::{
    all_pairs_bellman_ford_path, all_pairs_bellman_ford_path_length, all_pairs_dijkstra,
    all_pairs_dijkstra_path, all_pairs_dijkstra_path_length, johnson, process_bellman_ford_chunk,
    process_dijkstra_chunk, process_johnson_chunk,
};

use crate::seq::PathTree;
use parcore::Graph;
use std::collections::BTreeMap;

/// Distance to every reached target, keyed by label
pub type Lengths = BTreeMap<String, f64>;

/// Node path to every reached target, keyed by label
pub type Paths = BTreeMap<String, Vec<String>>;

pub(crate) fn tree_lengths(graph: &Graph, tree: &PathTree) -> Lengths {
    tree.distances()
        .map(|(n, d)| (graph.label(n).to_string(), d))
        .collect()
}

pub(crate) fn tree_paths(graph: &Graph, tree: &PathTree) -> Paths {
    tree.paths()
        .into_iter()
        .map(|(n, path)| {
            let labels = path.iter().map(|&m| graph.label(m).to_string()).collect();
            (graph.label(n).to_string(), labels)
        })
        .collect()
}
