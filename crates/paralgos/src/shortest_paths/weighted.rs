use super::{tree_lengths, tree_paths, Lengths, Paths};
use crate::context::{node_chunks, WeightedGraph};
use crate::seq::{self, PathTree};
use parcore::{ChunkingPolicy, EdgeAttrs, EngineError, Graph, GraphArg, NodeIndex, Weight, WeightFn};
use parruntime::{chunk_units, Engine, FlattenChunks, UnitResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Turns one search tree into the per-source result of an algorithm
type Projection<R> = fn(&Graph, &PathTree) -> R;

fn lengths_and_paths(graph: &Graph, tree: &PathTree) -> (Lengths, Paths) {
    (tree_lengths(graph, tree), tree_paths(graph, tree))
}

/// Dijkstra from every node in `chunk`.
pub fn process_dijkstra_chunk<R>(
    ctx: &WeightedGraph,
    chunk: &[NodeIndex],
    cutoff: Option<f64>,
    project: Projection<R>,
) -> UnitResult<Vec<(String, R)>> {
    chunk
        .iter()
        .map(|&source| {
            let tree = seq::dijkstra(ctx.graph.as_ref(), source, ctx.weight.as_ref(), cutoff)?;
            Ok((ctx.label(source), project(ctx.graph.as_ref(), &tree)))
        })
        .collect()
}

/// Bellman-Ford from every node in `chunk`.
pub fn process_bellman_ford_chunk<R>(
    ctx: &WeightedGraph,
    chunk: &[NodeIndex],
    project: Projection<R>,
) -> UnitResult<Vec<(String, R)>> {
    chunk
        .iter()
        .map(|&source| {
            let tree = seq::bellman_ford(ctx.graph.as_ref(), &[source], ctx.weight.as_ref())?;
            Ok((ctx.label(source), project(ctx.graph.as_ref(), &tree)))
        })
        .collect()
}

fn dijkstra_stream<R>(
    engine: &Engine,
    graph: GraphArg,
    weight: &Weight,
    cutoff: Option<f64>,
    policy: &ChunkingPolicy<NodeIndex>,
    label: &str,
    project: Projection<R>,
) -> Result<FlattenChunks<(String, R)>, EngineError>
where
    R: Send + 'static,
{
    let graph = graph.into_concrete();
    let chunks = node_chunks(engine, &graph, policy)?;
    let ctx = Arc::new(WeightedGraph::new(graph, weight));
    let units = chunk_units(chunks, ctx, move |ctx, chunk| {
        process_dijkstra_chunk(ctx, &chunk, cutoff, project)
    });
    Ok(engine.lazy(label, units).flatten_chunks())
}

fn bellman_ford_stream<R>(
    engine: &Engine,
    graph: GraphArg,
    weight: &Weight,
    policy: &ChunkingPolicy<NodeIndex>,
    label: &str,
    project: Projection<R>,
) -> Result<FlattenChunks<(String, R)>, EngineError>
where
    R: Send + 'static,
{
    let graph = graph.into_concrete();
    let chunks = node_chunks(engine, &graph, policy)?;
    let ctx = Arc::new(WeightedGraph::new(graph, weight));
    let units = chunk_units(chunks, ctx, move |ctx, chunk| {
        process_bellman_ford_chunk(ctx, &chunk, project)
    });
    Ok(engine.lazy(label, units).flatten_chunks())
}

/// `(source, (distances, paths))` for every source, lazily in node order.
pub fn all_pairs_dijkstra(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    weight: &Weight,
    cutoff: Option<f64>,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<FlattenChunks<(String, (Lengths, Paths))>, EngineError> {
    dijkstra_stream(engine, graph.into(), weight, cutoff, policy, "all_pairs_dijkstra", lengths_and_paths)
}

pub fn all_pairs_dijkstra_path_length(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    weight: &Weight,
    cutoff: Option<f64>,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<FlattenChunks<(String, Lengths)>, EngineError> {
    dijkstra_stream(
        engine,
        graph.into(),
        weight,
        cutoff,
        policy,
        "all_pairs_dijkstra_path_length",
        tree_lengths,
    )
}

pub fn all_pairs_dijkstra_path(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    weight: &Weight,
    cutoff: Option<f64>,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<FlattenChunks<(String, Paths)>, EngineError> {
    dijkstra_stream(engine, graph.into(), weight, cutoff, policy, "all_pairs_dijkstra_path", tree_paths)
}

/// Negative edges are allowed; a negative cycle reachable from a source
/// surfaces as that chunk's `WorkerFailure`.
pub fn all_pairs_bellman_ford_path_length(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    weight: &Weight,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<FlattenChunks<(String, Lengths)>, EngineError> {
    bellman_ford_stream(
        engine,
        graph.into(),
        weight,
        policy,
        "all_pairs_bellman_ford_path_length",
        tree_lengths,
    )
}

pub fn all_pairs_bellman_ford_path(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    weight: &Weight,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<FlattenChunks<(String, Paths)>, EngineError> {
    bellman_ford_stream(
        engine,
        graph.into(),
        weight,
        policy,
        "all_pairs_bellman_ford_path",
        tree_paths,
    )
}

/// Dijkstra paths from every node in `chunk` under the reweighted costs.
pub fn process_johnson_chunk(ctx: &WeightedGraph, chunk: &[NodeIndex]) -> UnitResult<Vec<(String, Paths)>> {
    process_dijkstra_chunk(ctx, chunk, None, tree_paths)
}

/// All-pairs shortest paths via Johnson's reweighting.
///
/// Bellman-Ford from every node at distance 0 gives potentials `h` once, on
/// the calling thread; each chunk then runs Dijkstra with costs
/// `w(u, v) + h(u) - h(v)`.
pub fn johnson(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    weight: &Weight,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<BTreeMap<String, Paths>, EngineError> {
    let graph = graph.into().into_concrete();
    let base = weight.resolve(&graph);

    let potentials = engine.precompute("johnson.potentials", || {
        let sources: Vec<NodeIndex> = graph.node_indices().collect();
        let tree = seq::bellman_ford(graph.as_ref(), &sources, base.as_ref())?;
        Ok(graph
            .node_indices()
            .map(|n| tree.distance(n).unwrap_or(0.0))
            .collect::<Vec<f64>>())
    })?;

    let reweighted: Arc<WeightFn> = {
        let h = Arc::clone(&potentials);
        Arc::new(move |u: NodeIndex, v: NodeIndex, attrs: &EdgeAttrs| {
            base(u, v, attrs).map(|w| w + h[u.index()] - h[v.index()])
        })
    };

    let chunks = node_chunks(engine, &graph, policy)?;
    let ctx = Arc::new(WeightedGraph {
        graph,
        weight: reweighted,
    });
    let units = chunk_units(chunks, ctx, |ctx, chunk| process_johnson_chunk(ctx, &chunk));
    let parts = engine.eager("johnson", units)?;
    Ok(parts.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcore::{AlgorithmError, ParallelGraph};

    fn engine(workers: usize) -> Engine {
        Engine::with_workers(workers).unwrap()
    }

    fn sample() -> Graph {
        let mut g = Graph::directed();
        g.add_weighted_edge("a", "b", 3.0);
        g.add_weighted_edge("a", "c", 1.0);
        g.add_weighted_edge("c", "b", 1.0);
        g.add_weighted_edge("b", "d", 2.0);
        g.add_weighted_edge("c", "d", 6.0);
        g.add_weighted_edge("d", "e", 1.0);
        g
    }

    fn collect<T>(stream: FlattenChunks<T>) -> Vec<T>
    where
        T: Send + 'static,
    {
        stream.collect::<Result<_, _>>().unwrap()
    }

    #[test]
    fn dijkstra_lengths_cover_every_source_in_order() {
        let rows = collect(
            all_pairs_dijkstra_path_length(&engine(2), sample(), &Weight::default(), None, &ChunkingPolicy::Default)
                .unwrap(),
        );
        let sources: Vec<&str> = rows.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(sources, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(rows[0].1["e"], 5.0);
        assert_eq!(rows[0].1["b"], 2.0);
    }

    #[test]
    fn results_do_not_depend_on_worker_count() {
        let reference = collect(
            all_pairs_dijkstra(&engine(1), sample(), &Weight::default(), None, &ChunkingPolicy::Default).unwrap(),
        );
        for workers in [2, 3, 8] {
            let rows = collect(
                all_pairs_dijkstra(&engine(workers), sample(), &Weight::default(), None, &ChunkingPolicy::Default)
                    .unwrap(),
            );
            assert_eq!(rows, reference);
        }
    }

    #[test]
    fn parallel_graph_argument_matches_plain_graph() {
        let plain = collect(
            all_pairs_dijkstra_path(&engine(2), sample(), &Weight::default(), None, &ChunkingPolicy::Default)
                .unwrap(),
        );
        let wrapped = collect(
            all_pairs_dijkstra_path(
                &engine(2),
                ParallelGraph::new(sample()),
                &Weight::default(),
                None,
                &ChunkingPolicy::Default,
            )
            .unwrap(),
        );
        assert_eq!(plain, wrapped);
        assert_eq!(plain[0].1["d"], vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn custom_chunking_keeps_source_order() {
        let policy = ChunkingPolicy::custom(|nodes: &[NodeIndex]| nodes.iter().map(|&n| vec![n]).collect());
        let rows = collect(
            all_pairs_bellman_ford_path_length(&engine(3), sample(), &Weight::default(), &policy).unwrap(),
        );
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].0, "e");
    }

    #[test]
    fn bellman_ford_negative_cycle_surfaces_once() {
        let mut g = sample();
        g.add_weighted_edge("e", "a", -10.0);
        let items: Vec<_> =
            all_pairs_bellman_ford_path(&engine(2), g, &Weight::default(), &ChunkingPolicy::Default)
                .unwrap()
                .collect();
        let failures: Vec<_> = items.iter().filter(|item| item.is_err()).collect();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            items.last(),
            Some(Err(EngineError::WorkerFailure {
                source: AlgorithmError::NegativeCycle,
                ..
            }))
        ));
    }

    #[test]
    fn johnson_with_negative_edge_matches_bellman_ford() {
        let mut g = sample();
        g.add_weighted_edge("c", "e", -2.0);
        let g = Arc::new(g);

        let expected: BTreeMap<String, Paths> = collect(
            all_pairs_bellman_ford_path(&engine(1), &g, &Weight::default(), &ChunkingPolicy::Default).unwrap(),
        )
        .into_iter()
        .collect();

        for workers in [1, 2, 4] {
            let paths = johnson(&engine(workers), &g, &Weight::default(), &ChunkingPolicy::Default).unwrap();
            assert_eq!(paths, expected);
        }
        let paths = johnson(&engine(2), &g, &Weight::default(), &ChunkingPolicy::Default).unwrap();
        assert_eq!(paths["a"]["e"], vec!["a", "c", "e"]);
    }

    #[test]
    fn johnson_negative_cycle_fails_before_dispatch() {
        let mut g = sample();
        g.add_weighted_edge("e", "a", -10.0);
        let err = johnson(&engine(2), g, &Weight::default(), &ChunkingPolicy::Default).unwrap_err();
        assert!(matches!(
            err,
            EngineError::PartialPrecomputeFailure {
                source: AlgorithmError::NegativeCycle,
                ..
            }
        ));
    }
}
