use parcore::{ChunkingPolicy, EngineError, Graph, NodeIndex, Weight, WeightFn};
use parruntime::Engine;
use std::sync::Arc;

/// Graph plus resolved edge costs, shared read-only by every unit of a run
pub struct WeightedGraph {
    pub graph: Arc<Graph>,
    pub weight: Arc<WeightFn>,
}

impl WeightedGraph {
    pub fn new(graph: Arc<Graph>, weight: &Weight) -> Self {
        let weight = weight.resolve(&graph);
        Self { graph, weight }
    }

    pub fn label(&self, n: NodeIndex) -> String {
        self.graph.label(n).to_string()
    }
}

/// Node universe of `graph` split for the engine's worker count.
pub fn node_chunks(
    engine: &Engine,
    graph: &Graph,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<Vec<Vec<NodeIndex>>, EngineError> {
    let chunks = engine.split(graph.node_indices().collect(), policy)?;
    tracing::debug!(
        "Split {} nodes into {} chunks for {} workers",
        graph.node_count(),
        chunks.len(),
        engine.workers()
    );
    Ok(chunks)
}

/// Resolve node labels, rejecting unknown ones.
pub fn resolve_nodes(graph: &Graph, labels: &[String]) -> Result<Vec<NodeIndex>, EngineError> {
    labels
        .iter()
        .map(|label| graph.require(label).map_err(EngineError::from))
        .collect()
}
