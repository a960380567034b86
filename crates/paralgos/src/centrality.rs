//! Betweenness centrality for nodes and edges.
//!
//! Each chunk of source nodes produces a partial Brandes sum over the whole
//! graph; partials are added on the calling thread and rescaled once.

use crate::context::node_chunks;
use crate::seq::brandes::{self, EdgeScores};
use parcore::{ChunkingPolicy, EngineError, Graph, GraphArg, NodeIndex, Value, Weight, WeightFn};
use parruntime::{chunk_units, Engine, UnitResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Options shared by node and edge betweenness
#[derive(Debug, Clone, Default)]
pub struct BetweennessOptions {
    /// Edge weight; `None` counts hops
    pub weight: Option<Weight>,
    pub normalized: bool,
    /// Count path endpoints (node betweenness only)
    pub endpoints: bool,
}

impl BetweennessOptions {
    pub fn normalized() -> Self {
        Self {
            normalized: true,
            ..Self::default()
        }
    }
}

/// Edge identity in results: `(source, target)`, plus the parallel-edge
/// key on multigraphs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLabel {
    pub source: String,
    pub target: String,
    pub key: Option<usize>,
}

impl EdgeLabel {
    fn pair(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            key: None,
        }
    }
}

impl From<EdgeLabel> for Value {
    fn from(edge: EdgeLabel) -> Self {
        let mut parts = vec![Value::from(edge.source), Value::from(edge.target)];
        if let Some(key) = edge.key {
            parts.push(Value::from(key));
        }
        Value::Array(parts)
    }
}

pub struct BrandesContext {
    graph: Arc<Graph>,
    weight: Option<Arc<WeightFn>>,
    endpoints: bool,
}

impl BrandesContext {
    fn new(graph: Arc<Graph>, options: &BetweennessOptions) -> Self {
        let weight = options.weight.as_ref().map(|w| w.resolve(&graph));
        Self {
            graph,
            weight,
            endpoints: options.endpoints,
        }
    }
}

/// Node betweenness contributed by the sources in `chunk`, indexed by node.
pub fn process_betweenness_chunk(ctx: &BrandesContext, chunk: &[NodeIndex]) -> UnitResult<Vec<f64>> {
    let mut scores = vec![0.0; ctx.graph.node_count()];
    for &s in chunk {
        let dag = brandes::shortest_path_dag(&ctx.graph, s, ctx.weight.as_deref());
        brandes::accumulate_nodes(&mut scores, dag, s, ctx.endpoints);
    }
    Ok(scores)
}

/// Edge betweenness contributed by the sources in `chunk`.
pub fn process_edge_betweenness_chunk(ctx: &BrandesContext, chunk: &[NodeIndex]) -> UnitResult<EdgeScores> {
    let mut scores = EdgeScores::new(&ctx.graph);
    for &s in chunk {
        let dag = brandes::shortest_path_dag(&ctx.graph, s, ctx.weight.as_deref());
        brandes::accumulate_edges(&mut scores, dag);
    }
    Ok(scores)
}

pub fn betweenness_centrality(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    options: &BetweennessOptions,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<BTreeMap<String, f64>, EngineError> {
    let graph = graph.into().into_concrete();
    let n = graph.node_count();
    let chunks = node_chunks(engine, &graph, policy)?;
    let ctx = Arc::new(BrandesContext::new(Arc::clone(&graph), options));
    let units = chunk_units(chunks, ctx, |ctx, chunk| process_betweenness_chunk(ctx, &chunk));

    let mut totals = engine.reduce("betweenness_centrality", units, vec![0.0; n], |mut acc, part| {
        for (total, value) in acc.iter_mut().zip(part) {
            *total += value;
        }
        acc
    })?;

    if let Some(scale) = brandes::node_scale(n, options.normalized, graph.is_directed(), options.endpoints) {
        totals.iter_mut().for_each(|value| *value *= scale);
    }

    Ok(graph
        .node_indices()
        .map(|v| (graph.label(v).to_string(), totals[v.index()]))
        .collect())
}

/// Betweenness of every edge in edge order. On a multigraph each parallel
/// edge gets its own keyed entry.
pub fn edge_betweenness_centrality(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    options: &BetweennessOptions,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<Vec<(EdgeLabel, f64)>, EngineError> {
    let graph = graph.into().into_concrete();
    let chunks = node_chunks(engine, &graph, policy)?;
    let ctx = Arc::new(BrandesContext::new(Arc::clone(&graph), options));
    let weight = ctx.weight.clone();
    let units = chunk_units(chunks, ctx, |ctx, chunk| process_edge_betweenness_chunk(ctx, &chunk));

    let mut totals = engine.reduce(
        "edge_betweenness_centrality",
        units,
        EdgeScores::new(&graph),
        |mut acc, part| {
            acc.merge(&part);
            acc
        },
    )?;

    if let Some(scale) = brandes::edge_scale(graph.node_count(), options.normalized, graph.is_directed()) {
        totals.scale(scale);
    }

    if graph.is_multigraph() {
        return Ok(totals
            .per_key(&graph, weight.as_deref())
            .into_iter()
            .map(|((u, v, key), score)| {
                let edge = EdgeLabel {
                    key: Some(key),
                    ..EdgeLabel::pair(graph.label(u), graph.label(v))
                };
                (edge, score)
            })
            .collect());
    }
    Ok(totals
        .iter()
        .map(|((u, v), score)| (EdgeLabel::pair(graph.label(u), graph.label(v)), score))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star(leaves: usize) -> Graph {
        let mut g = Graph::new();
        for i in 0..leaves {
            g.add_edge("hub", format!("leaf{}", i), Default::default());
        }
        g
    }

    fn engine(workers: usize) -> Engine {
        Engine::with_workers(workers).unwrap()
    }

    #[test]
    fn star_hub_is_fully_central() {
        let scores = betweenness_centrality(
            &engine(3),
            star(4),
            &BetweennessOptions::normalized(),
            &ChunkingPolicy::Default,
        )
        .unwrap();
        assert!((scores["hub"] - 1.0).abs() < 1e-12);
        assert_eq!(scores["leaf0"], 0.0);
    }

    #[test]
    fn unnormalized_star_counts_leaf_pairs() {
        let scores = betweenness_centrality(
            &engine(2),
            star(4),
            &BetweennessOptions::default(),
            &ChunkingPolicy::Default,
        )
        .unwrap();
        // C(4, 2) leaf pairs route through the hub.
        assert!((scores["hub"] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn chunking_does_not_change_scores() {
        let mut g = star(5);
        g.add_edge("leaf0", "leaf1", Default::default());
        g.add_edge("leaf1", "x", Default::default());
        let g = Arc::new(g);
        let options = BetweennessOptions::normalized();
        let reference = betweenness_centrality(&engine(1), &g, &options, &ChunkingPolicy::Default).unwrap();
        let singletons = ChunkingPolicy::custom(|nodes: &[NodeIndex]| nodes.iter().map(|&n| vec![n]).collect());
        for workers in [2, 4] {
            let scores = betweenness_centrality(&engine(workers), &g, &options, &singletons).unwrap();
            for (node, value) in &reference {
                assert!((scores[node] - value).abs() < 1e-12, "{node}");
            }
        }
    }

    #[test]
    fn weighted_betweenness_avoids_expensive_edges() {
        let mut g = Graph::new();
        g.add_weighted_edge("a", "b", 1.0);
        g.add_weighted_edge("b", "c", 1.0);
        g.add_weighted_edge("a", "c", 10.0);
        let options = BetweennessOptions {
            weight: Some(Weight::default()),
            ..BetweennessOptions::default()
        };
        let scores = betweenness_centrality(&engine(2), g, &options, &ChunkingPolicy::Default).unwrap();
        assert_eq!(scores["b"], 1.0);
    }

    #[test]
    fn edge_betweenness_of_path() {
        let mut g = Graph::new();
        g.add_edge("a", "b", Default::default());
        g.add_edge("b", "c", Default::default());
        let scores = edge_betweenness_centrality(
            &engine(2),
            g,
            &BetweennessOptions::normalized(),
            &ChunkingPolicy::Default,
        )
        .unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].0, EdgeLabel::pair("a", "b"));
        // 2 of the 3 pairs cross each edge, normalised by n(n-1)/2 = 3.
        assert!((scores[0].1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn multigraph_edges_are_reported_per_key() {
        let mut g = Graph::with_kind(false, true);
        g.add_edge("0", "1", Default::default());
        g.add_edge("0", "1", Default::default());
        g.add_edge("1", "2", Default::default());
        let scores = edge_betweenness_centrality(
            &engine(2),
            g,
            &BetweennessOptions::normalized(),
            &ChunkingPolicy::Default,
        )
        .unwrap();
        let keys: Vec<(&str, &str, Option<usize>)> = scores
            .iter()
            .map(|(e, _)| (e.source.as_str(), e.target.as_str(), e.key))
            .collect();
        assert_eq!(keys, vec![("0", "1", Some(0)), ("0", "1", Some(1)), ("1", "2", Some(0))]);
        assert!((scores[0].1 - 1.0 / 3.0).abs() < 1e-12);
        assert!((scores[1].1 - 1.0 / 3.0).abs() < 1e-12);
        assert!((scores[2].1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(Value::from(scores[1].0.clone()), Value::from(vec![
            Value::from("0"),
            Value::from("1"),
            Value::from(1usize),
        ]));
    }
}
