use parcore::{Graph, NodeIndex};
use std::collections::{HashSet, VecDeque};

/// Split-node flow network for vertex connectivity.
///
/// Every node `n` becomes `nA -> nB` and every edge `u -> v` becomes
/// `uB -> vA` (plus `vB -> uA` when undirected), all with capacity 1.
/// Parallel edges collapse to one arc. Built once, then shared read-only
/// between pair queries.
#[derive(Debug, Clone)]
pub struct AuxiliaryNetwork {
    head: Vec<usize>,
    capacity: Vec<usize>,
    arcs: Vec<Vec<usize>>,
}

impl AuxiliaryNetwork {
    pub fn build(graph: &Graph) -> Self {
        let n = graph.node_count();
        let mut network = Self {
            head: Vec::new(),
            capacity: Vec::new(),
            arcs: vec![Vec::new(); 2 * n],
        };
        for node in graph.node_indices() {
            network.add_arc(Self::a(node), Self::b(node), 1);
        }

        let mut added = HashSet::new();
        for (u, v, _) in graph.edges() {
            let mut pairs = vec![(Self::b(u), Self::a(v))];
            if !graph.is_directed() {
                pairs.push((Self::b(v), Self::a(u)));
            }
            for (from, to) in pairs {
                if added.insert((from, to)) {
                    network.add_arc(from, to, 1);
                }
            }
        }
        network
    }

    fn a(node: NodeIndex) -> usize {
        2 * node.index()
    }

    fn b(node: NodeIndex) -> usize {
        2 * node.index() + 1
    }

    // Arcs are stored in forward/reverse pairs so `arc ^ 1` is the twin.
    fn add_arc(&mut self, from: usize, to: usize, capacity: usize) {
        self.arcs[from].push(self.head.len());
        self.head.push(to);
        self.capacity.push(capacity);
        self.arcs[to].push(self.head.len());
        self.head.push(from);
        self.capacity.push(0);
    }

    /// Maximum `sB -> tA` flow, i.e. the local node connectivity of `s`
    /// and `t`.
    pub fn local_node_connectivity(&self, s: NodeIndex, t: NodeIndex) -> usize {
        self.max_flow(Self::b(s), Self::a(t))
    }

    /// Edmonds-Karp on a private copy of the residual capacities.
    fn max_flow(&self, source: usize, sink: usize) -> usize {
        if source == sink {
            return 0;
        }
        let mut residual = self.capacity.clone();
        let mut flow = 0;

        loop {
            let mut via: Vec<Option<usize>> = vec![None; self.arcs.len()];
            let mut visited = vec![false; self.arcs.len()];
            let mut queue = VecDeque::from([source]);
            visited[source] = true;

            while let Some(x) = queue.pop_front() {
                if x == sink {
                    break;
                }
                for &arc in &self.arcs[x] {
                    let y = self.head[arc];
                    if !visited[y] && residual[arc] > 0 {
                        visited[y] = true;
                        via[y] = Some(arc);
                        queue.push_back(y);
                    }
                }
            }
            if !visited[sink] {
                break;
            }

            let mut bottleneck = usize::MAX;
            let mut y = sink;
            while let Some(arc) = via[y] {
                bottleneck = bottleneck.min(residual[arc]);
                y = self.head[arc ^ 1];
            }
            y = sink;
            while let Some(arc) = via[y] {
                residual[arc] -= bottleneck;
                residual[arc ^ 1] += bottleneck;
                y = self.head[arc ^ 1];
            }
            flow += bottleneck;
        }

        flow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(n: usize) -> Graph {
        let mut g = Graph::new();
        for i in 0..n {
            g.add_edge(i.to_string(), ((i + 1) % n).to_string(), Default::default());
        }
        g
    }

    #[test]
    fn opposite_nodes_of_a_cycle_have_two_disjoint_paths() {
        let g = cycle(6);
        let network = AuxiliaryNetwork::build(&g);
        let s = g.index_of("0").unwrap();
        let t = g.index_of("3").unwrap();
        assert_eq!(network.local_node_connectivity(s, t), 2);
    }

    #[test]
    fn disconnected_nodes_have_zero_connectivity() {
        let mut g = Graph::new();
        g.add_edge("a", "b", Default::default());
        g.add_edge("c", "d", Default::default());
        let network = AuxiliaryNetwork::build(&g);
        let a = g.index_of("a").unwrap();
        let d = g.index_of("d").unwrap();
        assert_eq!(network.local_node_connectivity(a, d), 0);
    }

    #[test]
    fn directed_edges_only_count_forward() {
        let mut g = Graph::directed();
        g.add_edge("a", "b", Default::default());
        g.add_edge("b", "c", Default::default());
        let network = AuxiliaryNetwork::build(&g);
        let a = g.index_of("a").unwrap();
        let c = g.index_of("c").unwrap();
        assert_eq!(network.local_node_connectivity(a, c), 1);
        assert_eq!(network.local_node_connectivity(c, a), 0);
    }

    fn complete(n: usize) -> Graph {
        let mut g = Graph::new();
        for i in 0..n {
            for j in i + 1..n {
                g.add_edge(i.to_string(), j.to_string(), Default::default());
            }
        }
        g
    }

    #[test]
    fn adjacent_nodes_of_a_triangle() {
        // The direct edge plus the path through the third node.
        let g = complete(3);
        let network = AuxiliaryNetwork::build(&g);
        for (u, v) in [("0", "1"), ("0", "2"), ("1", "2")] {
            let (u, v) = (g.index_of(u).unwrap(), g.index_of(v).unwrap());
            assert_eq!(network.local_node_connectivity(u, v), 2);
            assert_eq!(network.local_node_connectivity(v, u), 2);
        }
    }

    #[test]
    fn adjacent_nodes_of_a_path_have_one_route() {
        let mut g = Graph::new();
        g.add_edge("0", "1", Default::default());
        g.add_edge("1", "2", Default::default());
        let network = AuxiliaryNetwork::build(&g);
        let ix = |label: &str| g.index_of(label).unwrap();
        assert_eq!(network.local_node_connectivity(ix("0"), ix("1")), 1);
        assert_eq!(network.local_node_connectivity(ix("1"), ix("2")), 1);
        assert_eq!(network.local_node_connectivity(ix("0"), ix("2")), 1);
    }

    #[test]
    fn adjacent_nodes_of_k5_do_not_scale_with_size() {
        let g = complete(5);
        let network = AuxiliaryNetwork::build(&g);
        let (u, v) = (g.index_of("0").unwrap(), g.index_of("1").unwrap());
        assert_eq!(network.local_node_connectivity(u, v), 4);
    }

    #[test]
    fn repeated_queries_do_not_share_residuals() {
        let g = cycle(4);
        let network = AuxiliaryNetwork::build(&g);
        let s = g.index_of("0").unwrap();
        let t = g.index_of("2").unwrap();
        let first = network.local_node_connectivity(s, t);
        assert_eq!(first, network.local_node_connectivity(s, t));
    }
}
