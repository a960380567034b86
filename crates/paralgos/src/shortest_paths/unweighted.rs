use super::{tree_lengths, tree_paths, Lengths, Paths};
use crate::context::node_chunks;
use crate::seq::{self, PathTree};
use parcore::{ChunkingPolicy, EngineError, Graph, GraphArg, NodeIndex};
use parruntime::{chunk_units, Engine, FlattenChunks, UnitResult};

/// Breadth-first search from every node in `chunk`.
pub fn process_bfs_chunk<R>(
    graph: &Graph,
    chunk: &[NodeIndex],
    cutoff: Option<usize>,
    project: fn(&Graph, &PathTree) -> R,
) -> UnitResult<Vec<(String, R)>> {
    Ok(chunk
        .iter()
        .map(|&source| {
            let tree = seq::bfs(graph, source, cutoff);
            (graph.label(source).to_string(), project(graph, &tree))
        })
        .collect())
}

fn bfs_stream<R>(
    engine: &Engine,
    graph: GraphArg,
    cutoff: Option<usize>,
    policy: &ChunkingPolicy<NodeIndex>,
    label: &str,
    project: fn(&Graph, &PathTree) -> R,
) -> Result<FlattenChunks<(String, R)>, EngineError>
where
    R: Send + 'static,
{
    let graph = graph.into_concrete();
    let chunks = node_chunks(engine, &graph, policy)?;
    let units = chunk_units(chunks, graph, move |graph, chunk| {
        process_bfs_chunk(graph, &chunk, cutoff, project)
    });
    Ok(engine.lazy(label, units).flatten_chunks())
}

/// Hop counts from every source, lazily in node order.
pub fn all_pairs_shortest_path_length(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    cutoff: Option<usize>,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<FlattenChunks<(String, Lengths)>, EngineError> {
    bfs_stream(
        engine,
        graph.into(),
        cutoff,
        policy,
        "all_pairs_shortest_path_length",
        tree_lengths,
    )
}

pub fn all_pairs_shortest_path(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    cutoff: Option<usize>,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<FlattenChunks<(String, Paths)>, EngineError> {
    bfs_stream(engine, graph.into(), cutoff, policy, "all_pairs_shortest_path", tree_paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Graph {
        let mut g = Graph::new();
        for (u, v) in [("00", "01"), ("01", "11"), ("00", "10"), ("10", "11"), ("11", "12")] {
            g.add_edge(u, v, Default::default());
        }
        g
    }

    #[test]
    fn lazy_and_eager_consumption_agree() {
        let engine = Engine::with_workers(3).unwrap();
        let mut lazy = Vec::new();
        for item in all_pairs_shortest_path_length(&engine, grid(), None, &ChunkingPolicy::Default).unwrap() {
            lazy.push(item.unwrap());
        }
        let eager: Vec<_> = all_pairs_shortest_path_length(&engine, grid(), None, &ChunkingPolicy::Default)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lazy, eager);
        assert_eq!(lazy[0].1["12"], 3.0);
    }

    #[test]
    fn cutoff_bounds_path_lengths() {
        let engine = Engine::with_workers(2).unwrap();
        let rows: Vec<_> = all_pairs_shortest_path(&engine, grid(), Some(1), &ChunkingPolicy::Default)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        for (_, paths) in rows {
            assert!(paths.values().all(|p| p.len() <= 2));
        }
    }

    #[test]
    fn first_result_arrives_before_draining() {
        let engine = Engine::with_workers(2).unwrap();
        let mut stream = all_pairs_shortest_path(&engine, grid(), None, &ChunkingPolicy::Default).unwrap();
        let (source, paths) = stream.next().unwrap().unwrap();
        assert_eq!(source, "00");
        assert_eq!(paths["00"], vec!["00"]);
        drop(stream);
    }
}
