use crate::context::node_chunks;
use crate::seq::structure::is_isolate;
use parcore::{ChunkingPolicy, EngineError, Graph, GraphArg, NodeIndex};
use parruntime::{chunk_units, Engine, UnitResult};

pub fn process_isolates_chunk(graph: &Graph, chunk: &[NodeIndex]) -> UnitResult<usize> {
    Ok(chunk.iter().filter(|&&v| is_isolate(graph, v)).count())
}

/// Number of nodes with no incident edges.
pub fn number_of_isolates(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<usize, EngineError> {
    let graph = graph.into().into_concrete();
    let chunks = node_chunks(engine, &graph, policy)?;
    let units = chunk_units(chunks, graph, |graph, chunk| process_isolates_chunk(graph, &chunk));
    engine.reduce("number_of_isolates", units, 0, |acc, part| acc + part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_isolated_nodes_only() {
        let mut g = Graph::directed();
        g.add_edge("a", "b", Default::default());
        g.add_edge("loop", "loop", Default::default());
        for name in ["x", "y", "z"] {
            g.add_node(name);
        }
        for workers in [1, 2, 5] {
            let engine = Engine::with_workers(workers).unwrap();
            assert_eq!(number_of_isolates(&engine, &g, &ChunkingPolicy::Default).unwrap(), 3);
        }
    }

    #[test]
    fn empty_graph_has_no_isolates() {
        let engine = Engine::with_workers(4).unwrap();
        assert_eq!(number_of_isolates(&engine, Graph::new(), &ChunkingPolicy::Default).unwrap(), 0);
    }
}
