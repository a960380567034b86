//! Pairwise node connectivity over a shared auxiliary flow network.

use crate::context::resolve_nodes;
use crate::seq::AuxiliaryNetwork;
use parcore::{ChunkingPolicy, EngineError, GraphArg, NodeIndex};
use parruntime::{chunk_units, Engine, UnitResult};
use std::collections::BTreeMap;

pub type NodePair = (NodeIndex, NodeIndex);

/// Connectivity of every pair in `chunk`, returned as `(u, v, k)` indices.
pub fn process_pair_chunk(network: &AuxiliaryNetwork, chunk: &[NodePair]) -> UnitResult<Vec<(NodePair, usize)>> {
    Ok(chunk
        .iter()
        .map(|&(u, v)| ((u, v), network.local_node_connectivity(u, v)))
        .collect())
}

/// Ordered pairs for directed graphs, unordered pairs otherwise.
fn node_pairs(nodes: &[NodeIndex], directed: bool) -> Vec<NodePair> {
    let mut pairs = Vec::new();
    for (i, &u) in nodes.iter().enumerate() {
        for (j, &v) in nodes.iter().enumerate() {
            if (directed && i != j) || (!directed && i < j) {
                pairs.push((u, v));
            }
        }
    }
    pairs
}

/// Local node connectivity between all pairs of `nbunch` (every node when
/// `None`), as `{u: {v: k}}`.
pub fn all_pairs_node_connectivity(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    nbunch: Option<&[String]>,
    policy: &ChunkingPolicy<NodePair>,
) -> Result<BTreeMap<String, BTreeMap<String, usize>>, EngineError> {
    let graph = graph.into().into_concrete();
    let nodes = match nbunch {
        Some(labels) => resolve_nodes(&graph, labels)?,
        None => graph.node_indices().collect(),
    };
    let directed = graph.is_directed();

    let mut all_pairs: BTreeMap<String, BTreeMap<String, usize>> = nodes
        .iter()
        .map(|&n| (graph.label(n).to_string(), BTreeMap::new()))
        .collect();

    let network = engine.precompute("all_pairs_node_connectivity.auxiliary", || {
        Ok(AuxiliaryNetwork::build(&graph))
    })?;
    let pairs = node_pairs(&nodes, directed);
    tracing::debug!("Computing node connectivity for {} pairs", pairs.len());
    let chunks = engine.split(pairs, policy)?;
    let units = chunk_units(chunks, network, |network, chunk| process_pair_chunk(network, &chunk));

    for ((u, v), k) in engine.eager("all_pairs_node_connectivity", units)?.into_iter().flatten() {
        let (u, v) = (graph.label(u).to_string(), graph.label(v).to_string());
        if !directed {
            all_pairs.entry(v.clone()).or_default().insert(u.clone(), k);
        }
        all_pairs.entry(u).or_default().insert(v, k);
    }
    Ok(all_pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcore::Graph;

    fn bowtie() -> Graph {
        // Two triangles sharing node c.
        let mut g = Graph::new();
        for (u, v) in [("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("d", "e"), ("e", "c")] {
            g.add_edge(u, v, Default::default());
        }
        g
    }

    #[test]
    fn cut_vertex_limits_connectivity() {
        let engine = Engine::with_workers(3).unwrap();
        let result = all_pairs_node_connectivity(&engine, bowtie(), None, &ChunkingPolicy::Default).unwrap();
        assert_eq!(result.len(), 5);
        assert_eq!(result["a"]["d"], 1);
        assert_eq!(result["d"]["a"], 1);
        assert_eq!(result["a"].len(), 4);
    }

    #[test]
    fn worker_count_does_not_change_result() {
        let g = std::sync::Arc::new(bowtie());
        let reference = all_pairs_node_connectivity(&Engine::with_workers(1).unwrap(), &g, None, &ChunkingPolicy::Default)
            .unwrap();
        let parallel = all_pairs_node_connectivity(&Engine::with_workers(4).unwrap(), &g, None, &ChunkingPolicy::Default)
            .unwrap();
        assert_eq!(reference, parallel);
    }

    #[test]
    fn directed_pairs_are_ordered() {
        let mut g = Graph::directed();
        g.add_edge("a", "b", Default::default());
        g.add_edge("b", "c", Default::default());
        let engine = Engine::with_workers(2).unwrap();
        let result = all_pairs_node_connectivity(&engine, g, None, &ChunkingPolicy::Default).unwrap();
        assert_eq!(result["a"]["c"], 1);
        assert_eq!(result["c"]["a"], 0);
    }

    #[test]
    fn adjacent_pairs_count_the_direct_edge_once() {
        let engine = Engine::with_workers(2).unwrap();
        let mut triangle = Graph::new();
        for (u, v) in [("0", "1"), ("1", "2"), ("2", "0")] {
            triangle.add_edge(u, v, Default::default());
        }
        let result = all_pairs_node_connectivity(&engine, triangle, None, &ChunkingPolicy::Default).unwrap();
        for (u, row) in &result {
            assert_eq!(row.len(), 2, "{u}");
            assert!(row.values().all(|&k| k == 2), "{u}: {row:?}");
        }

        let mut path = Graph::new();
        path.add_edge("0", "1", Default::default());
        path.add_edge("1", "2", Default::default());
        let result = all_pairs_node_connectivity(&engine, path, None, &ChunkingPolicy::Default).unwrap();
        assert_eq!(result["0"]["1"], 1);
        assert_eq!(result["0"]["2"], 1);
        assert_eq!(result["2"]["1"], 1);
    }

    #[test]
    fn nbunch_restricts_pairs() {
        let engine = Engine::with_workers(2).unwrap();
        let nbunch = vec!["a".to_string(), "e".to_string()];
        let result = all_pairs_node_connectivity(&engine, bowtie(), Some(nbunch.as_slice()), &ChunkingPolicy::Default).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result["a"]["e"], 1);
    }
}
