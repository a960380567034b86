use parcore::{Adjacency, AlgorithmError, NodeIndex, WeightFn};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// Distances and predecessors from one search.
///
/// `order` lists reached nodes in the order the search first fixed them
/// (settle order for Dijkstra, discovery order for BFS and Bellman-Ford).
#[derive(Debug, Clone)]
pub struct PathTree {
    order: Vec<NodeIndex>,
    dist: Vec<Option<f64>>,
    pred: Vec<Option<NodeIndex>>,
}

impl PathTree {
    fn new(bound: usize) -> Self {
        Self {
            order: Vec::new(),
            dist: vec![None; bound],
            pred: vec![None; bound],
        }
    }

    fn reach(&mut self, n: NodeIndex, d: f64) {
        if self.dist[n.index()].is_none() {
            self.order.push(n);
        }
        self.dist[n.index()] = Some(d);
    }

    pub fn reached(&self) -> usize {
        self.order.len()
    }

    pub fn distance(&self, n: NodeIndex) -> Option<f64> {
        self.dist.get(n.index()).copied().flatten()
    }

    /// `(node, distance)` for every reached node
    pub fn distances(&self) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.order
            .iter()
            .filter_map(move |&n| self.distance(n).map(|d| (n, d)))
    }

    /// Node sequence from the search root to `target`.
    pub fn path_to(&self, target: NodeIndex) -> Option<Vec<NodeIndex>> {
        self.distance(target)?;
        let mut path = vec![target];
        let mut current = target;
        while let Some(prev) = self.pred[current.index()] {
            if path.len() > self.dist.len() {
                break;
            }
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Some(path)
    }

    pub fn paths(&self) -> Vec<(NodeIndex, Vec<NodeIndex>)> {
        self.order
            .iter()
            .filter_map(|&n| self.path_to(n).map(|p| (n, p)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Scored {
    pub cost: f64,
    pub seq: usize,
    pub node: NodeIndex,
    pub pred: NodeIndex,
}

impl PartialEq for Scored {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scored {}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so BinaryHeap pops the cheapest, oldest entry first.
impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Single-source Dijkstra. Edges costing more than `cutoff` in total are
/// not followed.
pub fn dijkstra<G>(
    graph: &G,
    source: NodeIndex,
    weight: &WeightFn,
    cutoff: Option<f64>,
) -> Result<PathTree, AlgorithmError>
where
    G: Adjacency + ?Sized,
{
    let bound = graph.node_bound();
    let mut tree = PathTree::new(bound);
    let mut seen: Vec<Option<f64>> = vec![None; bound];
    let mut heap = BinaryHeap::new();
    let mut seq = 0;

    seen[source.index()] = Some(0.0);
    heap.push(Scored {
        cost: 0.0,
        seq,
        node: source,
        pred: source,
    });

    while let Some(Scored { cost, node: v, .. }) = heap.pop() {
        if tree.dist[v.index()].is_some() {
            continue;
        }
        tree.reach(v, cost);

        for (u, w) in graph.weighted_neighbor_ids(v, weight) {
            let candidate = cost + w;
            if cutoff.is_some_and(|limit| candidate > limit) {
                continue;
            }
            if let Some(settled) = tree.dist[u.index()] {
                if candidate < settled {
                    return Err(AlgorithmError::Failed(
                        "contradictory paths found: negative weights?".to_string(),
                    ));
                }
            } else if seen[u.index()].map_or(true, |best| candidate < best) {
                seen[u.index()] = Some(candidate);
                seq += 1;
                heap.push(Scored {
                    cost: candidate,
                    seq,
                    node: u,
                    pred: v,
                });
                tree.pred[u.index()] = Some(v);
            }
        }
    }

    Ok(tree)
}

/// Queue-based Bellman-Ford from every node in `sources` at distance 0.
///
/// Fails with [`AlgorithmError::NegativeCycle`] when a negative cycle is
/// reachable from any source.
pub fn bellman_ford<G>(
    graph: &G,
    sources: &[NodeIndex],
    weight: &WeightFn,
) -> Result<PathTree, AlgorithmError>
where
    G: Adjacency + ?Sized,
{
    let bound = graph.node_bound();
    let n = graph.node_ids().len();
    let mut tree = PathTree::new(bound);
    let mut hops = vec![0usize; bound];
    let mut queued = vec![false; bound];
    let mut queue = VecDeque::new();

    for &s in sources {
        if tree.dist[s.index()].is_none() {
            tree.reach(s, 0.0);
            queue.push_back(s);
            queued[s.index()] = true;
        }
    }

    while let Some(u) = queue.pop_front() {
        queued[u.index()] = false;
        let Some(du) = tree.dist[u.index()] else {
            continue;
        };
        for (v, w) in graph.weighted_neighbor_ids(u, weight) {
            let candidate = du + w;
            if tree.dist[v.index()].map_or(true, |dv| candidate < dv) {
                hops[v.index()] = hops[u.index()] + 1;
                if hops[v.index()] >= n {
                    return Err(AlgorithmError::NegativeCycle);
                }
                tree.reach(v, candidate);
                tree.pred[v.index()] = Some(u);
                if !queued[v.index()] {
                    queued[v.index()] = true;
                    queue.push_back(v);
                }
            }
        }
    }

    Ok(tree)
}

/// Breadth-first search; distances are hop counts. With a cutoff, nodes
/// further than `cutoff` hops are not reached.
pub fn bfs<G>(graph: &G, source: NodeIndex, cutoff: Option<usize>) -> PathTree
where
    G: Adjacency + ?Sized,
{
    let mut tree = PathTree::new(graph.node_bound());
    let mut queue = VecDeque::new();
    tree.reach(source, 0.0);
    queue.push_back((source, 0usize));

    while let Some((v, depth)) = queue.pop_front() {
        if cutoff.is_some_and(|limit| depth >= limit) {
            continue;
        }
        for u in graph.neighbor_ids(v) {
            if tree.dist[u.index()].is_none() {
                tree.reach(u, (depth + 1) as f64);
                tree.pred[u.index()] = Some(v);
                queue.push_back((u, depth + 1));
            }
        }
    }

    tree
}
