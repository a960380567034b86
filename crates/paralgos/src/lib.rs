//! Parallel graph algorithm library
//!
//! Every algorithm splits its node (or node pair) set into chunks, runs a
//! sequential kernel from [`seq`] over each chunk on the engine's workers,
//! then merges the partial results in submission order.

mod catalog;
mod context;

pub mod centrality;
pub mod cluster;
pub mod connectivity;
pub mod efficiency;
pub mod isolate;
pub mod seq;
pub mod shortest_paths;
pub mod vitality;

pub use catalog::{default_registry, register_all};
pub use centrality::{betweenness_centrality, edge_betweenness_centrality, BetweennessOptions, EdgeLabel};
pub use cluster::square_clustering;
pub use connectivity::{all_pairs_node_connectivity, NodePair};
pub use context::WeightedGraph;
pub use efficiency::local_efficiency;
pub use isolate::number_of_isolates;
pub use shortest_paths::{
    all_pairs_bellman_ford_path, all_pairs_bellman_ford_path_length, all_pairs_dijkstra,
    all_pairs_dijkstra_path, all_pairs_dijkstra_path_length, all_pairs_shortest_path,
    all_pairs_shortest_path_length, johnson,
};
pub use vitality::{closeness_vitality, closeness_vitality_of};
