use super::paths::{bfs, dijkstra};
use parcore::{Adjacency, AlgorithmError, Graph, NodeIndex, WeightFn};
use std::collections::HashSet;

pub fn is_isolate(graph: &Graph, n: NodeIndex) -> bool {
    graph.degree(n) == 0
}

/// Sum of shortest-path distances over all node pairs, infinite when some
/// pair is unreachable. Undirected graphs count each pair once.
pub fn wiener_index<G>(graph: &G, weight: Option<&WeightFn>) -> Result<f64, AlgorithmError>
where
    G: Adjacency + ?Sized,
{
    let nodes = graph.node_ids();
    let mut total = 0.0;
    for &source in &nodes {
        let tree = match weight {
            None => bfs(graph, source, None),
            Some(weight) => dijkstra(graph, source, weight, None)?,
        };
        if tree.reached() < nodes.len() {
            return Ok(f64::INFINITY);
        }
        total += tree.distances().map(|(_, d)| d).sum::<f64>();
    }
    Ok(if graph.is_directed() { total } else { total / 2.0 })
}

/// Distinct-neighbour sets for every node, indexed by node index
pub fn neighbor_sets(graph: &Graph) -> Vec<HashSet<NodeIndex>> {
    graph
        .node_indices()
        .map(|n| graph.neighbors(n).into_iter().collect())
        .collect()
}

/// Squares through `v` relative to the number of potential squares.
pub fn square_clustering(adj: &[HashSet<NodeIndex>], v: NodeIndex) -> f64 {
    let neighbors: Vec<NodeIndex> = adj[v.index()].iter().copied().collect();
    let mut squares_total = 0i64;
    let mut potential = 0i64;

    for (i, &u) in neighbors.iter().enumerate() {
        for &w in &neighbors[i + 1..] {
            let squares = adj[u.index()]
                .intersection(&adj[w.index()])
                .filter(|&&x| x != v)
                .count() as i64;
            squares_total += squares;
            let mut degm = squares + 1;
            if adj[u.index()].contains(&w) {
                degm += 1;
            }
            // Self-loops can push degm past a degree, so stay signed.
            let du = adj[u.index()].len() as i64;
            let dw = adj[w.index()].len() as i64;
            potential += (du - degm) + (dw - degm) + squares;
        }
    }

    if potential > 0 {
        squares_total as f64 / potential as f64
    } else {
        0.0
    }
}

/// Average inverse shortest-path distance over ordered node pairs.
pub fn global_efficiency<G>(graph: &G) -> f64
where
    G: Adjacency + ?Sized,
{
    let nodes = graph.node_ids();
    let n = nodes.len();
    let denom = n * n.saturating_sub(1);
    if denom == 0 {
        return 0.0;
    }
    let mut efficiency = 0.0;
    for &source in &nodes {
        for (_, d) in bfs(graph, source, None).distances() {
            if d > 0.0 {
                efficiency += 1.0 / d;
            }
        }
    }
    efficiency / denom as f64
}

/// Global efficiency of the subgraph induced by the neighbours of `v`.
pub fn local_efficiency_of(graph: &Graph, v: NodeIndex) -> f64 {
    let neighborhood: HashSet<NodeIndex> = graph.neighbors(v).into_iter().collect();
    global_efficiency(&graph.filtered(|n| neighborhood.contains(&n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn complete(n: usize) -> Graph {
        let mut g = Graph::new();
        for i in 0..n {
            for j in (i + 1)..n {
                g.add_edge(i.to_string(), j.to_string(), Default::default());
            }
        }
        g
    }

    #[test]
    fn wiener_index_of_path_and_disconnected() {
        let mut g = Graph::new();
        g.add_edge("a", "b", Default::default());
        g.add_edge("b", "c", Default::default());
        // 1 + 2 + 1
        assert_eq!(wiener_index(&g, None).unwrap(), 4.0);
        g.add_node("lonely");
        assert!(wiener_index(&g, None).unwrap().is_infinite());
    }

    #[test]
    fn wiener_index_uses_weights() {
        let mut g = Graph::new();
        g.add_weighted_edge("a", "b", 2.0);
        g.add_weighted_edge("b", "c", 3.0);
        let g = Arc::new(g);
        let w = parcore::Weight::default().resolve(&g);
        assert_eq!(wiener_index(g.as_ref(), Some(w.as_ref())).unwrap(), 10.0);
    }

    #[test]
    fn square_clustering_of_cycle_and_complete_graph() {
        let mut square = Graph::new();
        for (u, v) in [("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")] {
            square.add_edge(u, v, Default::default());
        }
        let adj = neighbor_sets(&square);
        for n in square.node_indices() {
            assert_eq!(square_clustering(&adj, n), 1.0);
        }

        let k4 = complete(4);
        let adj = neighbor_sets(&k4);
        assert_eq!(square_clustering(&adj, NodeIndex::new(0)), 1.0);
    }

    #[test]
    fn efficiency_of_complete_graph_is_one() {
        let k4 = complete(4);
        assert_eq!(global_efficiency(&k4), 1.0);
        assert_eq!(local_efficiency_of(&k4, NodeIndex::new(0)), 1.0);
    }

    #[test]
    fn isolates_have_no_edges() {
        let mut g = Graph::new();
        g.add_node("x");
        g.add_edge("y", "y", Default::default());
        assert!(is_isolate(&g, g.index_of("x").unwrap()));
        assert!(!is_isolate(&g, g.index_of("y").unwrap()));
    }
}
