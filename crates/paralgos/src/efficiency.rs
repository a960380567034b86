use crate::context::node_chunks;
use crate::seq::structure::local_efficiency_of;
use parcore::{ChunkingPolicy, EngineError, Graph, GraphArg, NodeIndex};
use parruntime::{chunk_units, Engine, UnitResult};

/// Sum of neighbourhood efficiencies over `chunk`.
pub fn process_local_efficiency_chunk(graph: &Graph, chunk: &[NodeIndex]) -> UnitResult<f64> {
    Ok(chunk.iter().map(|&v| local_efficiency_of(graph, v)).sum())
}

/// Average local efficiency of an undirected graph. Empty graphs score 0.
pub fn local_efficiency(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<f64, EngineError> {
    let graph = graph.into().into_concrete();
    if graph.is_directed() {
        return Err(EngineError::InvalidArgument(
            "local_efficiency is not implemented for directed graphs".to_string(),
        ));
    }
    let n = graph.node_count();
    if n == 0 {
        return Ok(0.0);
    }
    let chunks = node_chunks(engine, &graph, policy)?;
    let units = chunk_units(chunks, graph, |graph, chunk| process_local_efficiency_chunk(graph, &chunk));
    let total = engine.reduce("local_efficiency", units, 0.0, |acc, part| acc + part)?;
    Ok(total / n as f64)
}
