use crate::context::{node_chunks, resolve_nodes};
use crate::seq::structure::{neighbor_sets, square_clustering as square_clustering_of};
use parcore::{ChunkingPolicy, EngineError, GraphArg, NodeIndex};
use parruntime::{chunk_units, Engine, UnitResult};
use std::collections::{BTreeMap, HashSet};

/// Neighbour sets and labels, built once per call
pub struct SquareContext {
    adjacency: Vec<HashSet<NodeIndex>>,
    labels: Vec<String>,
}

pub fn process_square_clustering_chunk(
    ctx: &SquareContext,
    chunk: &[NodeIndex],
) -> UnitResult<Vec<(String, f64)>> {
    Ok(chunk
        .iter()
        .map(|&v| (ctx.labels[v.index()].clone(), square_clustering_of(&ctx.adjacency, v)))
        .collect())
}

/// Square clustering coefficient of `nodes` (every node when `None`).
pub fn square_clustering(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    nodes: Option<&[String]>,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<BTreeMap<String, f64>, EngineError> {
    let graph = graph.into().into_concrete();
    let chunks = match nodes {
        Some(labels) => engine.split(resolve_nodes(&graph, labels)?, policy)?,
        None => node_chunks(engine, &graph, policy)?,
    };
    let ctx = engine.precompute("square_clustering.neighbors", || {
        Ok(SquareContext {
            adjacency: neighbor_sets(&graph),
            labels: graph.labels().map(str::to_string).collect(),
        })
    })?;

    let units = chunk_units(chunks, ctx, |ctx, chunk| process_square_clustering_chunk(ctx, &chunk));
    let parts = engine.eager("square_clustering", units)?;
    Ok(parts.into_iter().flatten().collect())
}
