//! Brandes accumulation for node and edge betweenness.

use super::paths::Scored;
use parcore::{Adjacency, Graph, NodeIndex, WeightFn};
use std::collections::{BinaryHeap, HashMap, VecDeque};

/// Shortest-path DAG from one source: nodes in non-decreasing distance,
/// predecessor lists and path counts.
pub struct SourceDag {
    pub stack: Vec<NodeIndex>,
    pub preds: Vec<Vec<NodeIndex>>,
    pub sigma: Vec<f64>,
}

pub fn shortest_path_dag(graph: &Graph, source: NodeIndex, weight: Option<&WeightFn>) -> SourceDag {
    match weight {
        None => unweighted_dag(graph, source),
        Some(weight) => weighted_dag(graph, source, weight),
    }
}

fn unweighted_dag(graph: &Graph, s: NodeIndex) -> SourceDag {
    let bound = graph.node_bound();
    let mut stack = Vec::new();
    let mut preds = vec![Vec::new(); bound];
    let mut sigma = vec![0.0; bound];
    let mut dist: Vec<Option<usize>> = vec![None; bound];
    let mut queue = VecDeque::new();

    sigma[s.index()] = 1.0;
    dist[s.index()] = Some(0);
    queue.push_back(s);

    while let Some(v) = queue.pop_front() {
        stack.push(v);
        let dv = dist[v.index()].unwrap_or_default();
        let sv = sigma[v.index()];
        for w in graph.neighbors(v) {
            if dist[w.index()].is_none() {
                dist[w.index()] = Some(dv + 1);
                queue.push_back(w);
            }
            if dist[w.index()] == Some(dv + 1) {
                sigma[w.index()] += sv;
                preds[w.index()].push(v);
            }
        }
    }

    SourceDag { stack, preds, sigma }
}

fn weighted_dag(graph: &Graph, s: NodeIndex, weight: &WeightFn) -> SourceDag {
    let bound = graph.node_bound();
    let mut stack = Vec::new();
    let mut preds = vec![Vec::new(); bound];
    let mut sigma = vec![0.0; bound];
    let mut settled: Vec<Option<f64>> = vec![None; bound];
    let mut seen: Vec<Option<f64>> = vec![None; bound];
    let mut heap = BinaryHeap::new();
    let mut seq = 0;

    sigma[s.index()] = 1.0;
    seen[s.index()] = Some(0.0);
    heap.push(Scored {
        cost: 0.0,
        seq,
        node: s,
        pred: s,
    });

    while let Some(Scored { cost, node: v, pred, .. }) = heap.pop() {
        if settled[v.index()].is_some() {
            continue;
        }
        if v != s {
            sigma[v.index()] += sigma[pred.index()];
        }
        stack.push(v);
        settled[v.index()] = Some(cost);

        for (w, edge_cost) in graph.weighted_neighbors(v, weight) {
            let candidate = cost + edge_cost;
            let unsettled = settled[w.index()].is_none();
            if unsettled && seen[w.index()].map_or(true, |best| candidate < best) {
                seen[w.index()] = Some(candidate);
                seq += 1;
                heap.push(Scored {
                    cost: candidate,
                    seq,
                    node: w,
                    pred: v,
                });
                sigma[w.index()] = 0.0;
                preds[w.index()] = vec![v];
            } else if seen[w.index()] == Some(candidate) {
                sigma[w.index()] += sigma[v.index()];
                preds[w.index()].push(v);
            }
        }
    }

    SourceDag { stack, preds, sigma }
}

/// Add the dependencies of `s` to `scores`.
pub fn accumulate_nodes(scores: &mut [f64], dag: SourceDag, s: NodeIndex, endpoints: bool) {
    let SourceDag {
        mut stack,
        preds,
        sigma,
    } = dag;
    let mut delta = vec![0.0; sigma.len()];
    if endpoints {
        scores[s.index()] += stack.len().saturating_sub(1) as f64;
    }
    while let Some(w) = stack.pop() {
        let coeff = (1.0 + delta[w.index()]) / sigma[w.index()];
        for &v in &preds[w.index()] {
            delta[v.index()] += sigma[v.index()] * coeff;
        }
        if w != s {
            scores[w.index()] += delta[w.index()];
            if endpoints {
                scores[w.index()] += 1.0;
            }
        }
    }
}

/// Betweenness totals keyed by node pair, in the graph's edge order.
///
/// Parallel edges accumulate into one pair entry; [`EdgeScores::per_key`]
/// splits it between them. Undirected edges are keyed in the orientation
/// they were added.
#[derive(Debug, Clone)]
pub struct EdgeScores {
    keys: Vec<(NodeIndex, NodeIndex)>,
    slot: HashMap<(NodeIndex, NodeIndex), usize>,
    values: Vec<f64>,
    directed: bool,
}

impl EdgeScores {
    pub fn new(graph: &Graph) -> Self {
        let mut keys = Vec::new();
        let mut slot = HashMap::new();
        for (u, v, _) in graph.edges() {
            let known = slot.contains_key(&(u, v)) || (!graph.is_directed() && slot.contains_key(&(v, u)));
            if !known {
                slot.insert((u, v), keys.len());
                keys.push((u, v));
            }
        }
        let values = vec![0.0; keys.len()];
        Self {
            keys,
            slot,
            values,
            directed: graph.is_directed(),
        }
    }

    fn add(&mut self, v: NodeIndex, w: NodeIndex, amount: f64) {
        let index = match self.slot.get(&(v, w)) {
            Some(&i) => Some(i),
            None if !self.directed => self.slot.get(&(w, v)).copied(),
            None => None,
        };
        if let Some(i) = index {
            self.values[i] += amount;
        }
    }

    /// Element-wise sum of another partial built from the same graph
    pub fn merge(&mut self, other: &EdgeScores) {
        for (mine, theirs) in self.values.iter_mut().zip(&other.values) {
            *mine += theirs;
        }
    }

    pub fn scale(&mut self, factor: f64) {
        for value in &mut self.values {
            *value *= factor;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ((NodeIndex, NodeIndex), f64)> + '_ {
        self.keys.iter().copied().zip(self.values.iter().copied())
    }

    /// Pair totals split across parallel edges as `((u, v, key), score)`.
    ///
    /// The total is shared evenly by the parallel edges of cheapest cost
    /// under `weight` (all of them when unweighted); dearer ones score 0.
    pub fn per_key(&self, graph: &Graph, weight: Option<&WeightFn>) -> Vec<((NodeIndex, NodeIndex, usize), f64)> {
        let mut scores = Vec::new();
        for ((u, v), total) in self.iter() {
            let costs: Vec<Option<f64>> = graph
                .parallel_edges(u, v)
                .into_iter()
                .map(|attrs| match weight {
                    None => Some(1.0),
                    Some(weight) => weight(u, v, attrs),
                })
                .collect();
            let cheapest = costs.iter().flatten().copied().fold(f64::INFINITY, f64::min);
            let carriers = costs.iter().filter(|&&cost| cost == Some(cheapest)).count();
            for (key, cost) in costs.into_iter().enumerate() {
                let share = if cost == Some(cheapest) {
                    total / carriers as f64
                } else {
                    0.0
                };
                scores.push(((u, v, key), share));
            }
        }
        scores
    }
}

pub fn accumulate_edges(scores: &mut EdgeScores, dag: SourceDag) {
    let SourceDag {
        mut stack,
        preds,
        sigma,
    } = dag;
    let mut delta = vec![0.0; sigma.len()];
    while let Some(w) = stack.pop() {
        let coeff = (1.0 + delta[w.index()]) / sigma[w.index()];
        for &v in &preds[w.index()] {
            let c = sigma[v.index()] * coeff;
            scores.add(v, w, c);
            delta[v.index()] += c;
        }
    }
}

/// Scale factor applied to summed node betweenness
pub fn node_scale(n: usize, normalized: bool, directed: bool, endpoints: bool) -> Option<f64> {
    if normalized {
        if endpoints {
            (n >= 2).then(|| 1.0 / (n as f64 * (n as f64 - 1.0)))
        } else {
            (n > 2).then(|| 1.0 / ((n as f64 - 1.0) * (n as f64 - 2.0)))
        }
    } else if !directed {
        Some(0.5)
    } else {
        None
    }
}

/// Scale factor applied to summed edge betweenness
pub fn edge_scale(n: usize, normalized: bool, directed: bool) -> Option<f64> {
    if normalized {
        (n > 1).then(|| 1.0 / (n as f64 * (n as f64 - 1.0)))
    } else if !directed {
        Some(0.5)
    } else {
        None
    }
}
