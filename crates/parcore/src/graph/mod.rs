//! Host graph representation and the parallel-capable adapter around it.
//!
//! [`Graph`] is the concrete graph every algorithm runs on. [`ParallelGraph`]
//! wraps a shared `Graph` so call sites can hand either form to an entry
//! point through [`GraphArg`]; entry points always unwrap to the concrete
//! graph before dispatching work.

mod adapter;
mod io;
mod weight;

pub use adapter::{convert_from, convert_to, GraphArg, GraphView, ParallelGraph};
pub use io::{EdgeData, GraphData};
pub use weight::{Weight, WeightFn};

pub use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::GraphError;
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Numeric edge attributes, looked up by name through [`Weight`].
pub type EdgeAttrs = BTreeMap<String, f64>;

/// Labelled graph with runtime directed/multigraph flags.
///
/// Edges are stored once in a petgraph `DiGraph`; for undirected graphs the
/// adjacency accessors report each edge from both endpoints. Node order is
/// insertion order and never changes, since nodes are not removable.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    inner: DiGraph<String, EdgeAttrs>,
    index: HashMap<String, NodeIndex>,
    directed: bool,
    multigraph: bool,
}

impl Graph {
    /// Empty undirected simple graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directed() -> Self {
        Self::with_kind(true, false)
    }

    pub fn with_kind(directed: bool, multigraph: bool) -> Self {
        Self {
            directed,
            multigraph,
            ..Self::default()
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn is_multigraph(&self) -> bool {
        self.multigraph
    }

    /// Add a node, returning the existing index if the label is known.
    pub fn add_node(&mut self, label: impl Into<String>) -> NodeIndex {
        let label = label.into();
        if let Some(&ix) = self.index.get(&label) {
            return ix;
        }
        let ix = self.inner.add_node(label.clone());
        self.index.insert(label, ix);
        ix
    }

    /// Add an edge, creating missing endpoints.
    ///
    /// On a simple graph a repeated edge merges `attrs` into the existing
    /// edge; on a multigraph it adds a parallel edge with the next key.
    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        attrs: EdgeAttrs,
    ) -> EdgeIndex {
        let u = self.add_node(source);
        let v = self.add_node(target);

        if !self.multigraph {
            if let Some(existing) = self.find_edge(u, v) {
                if let Some(current) = self.inner.edge_weight_mut(existing) {
                    current.extend(attrs);
                }
                return existing;
            }
        }

        self.inner.add_edge(u, v, attrs)
    }

    pub fn add_weighted_edge(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        weight: f64,
    ) -> EdgeIndex {
        let mut attrs = EdgeAttrs::new();
        attrs.insert("weight".to_string(), weight);
        self.add_edge(source, target, attrs)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Node indices in insertion order
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.inner.node_indices()
    }

    /// Node labels in insertion order
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.node_weights().map(String::as_str)
    }

    pub fn label(&self, ix: NodeIndex) -> &str {
        self.inner
            .node_weight(ix)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn index_of(&self, label: &str) -> Option<NodeIndex> {
        self.index.get(label).copied()
    }

    pub fn require(&self, label: &str) -> Result<NodeIndex, GraphError> {
        self.index_of(label)
            .ok_or_else(|| GraphError::UnknownNode(label.to_string()))
    }

    /// All edges as `(source, target, attrs)` in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &EdgeAttrs)> + '_ {
        self.inner
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
    }

    /// Attributes of the `key`-th edge between `u` and `v` (key `None`
    /// means the first one). Undirected graphs match either orientation.
    pub fn edge_attrs(&self, u: &str, v: &str, key: Option<usize>) -> Option<&EdgeAttrs> {
        let u = self.index_of(u)?;
        let v = self.index_of(v)?;
        self.parallel_edges(u, v).get(key.unwrap_or(0)).copied()
    }

    /// Attributes of every edge between `u` and `v` in key order, i.e. the
    /// order they were added. Undirected graphs match either orientation.
    pub fn parallel_edges(&self, u: NodeIndex, v: NodeIndex) -> Vec<&EdgeAttrs> {
        let mut connecting: Vec<EdgeIndex> =
            self.inner.edges_connecting(u, v).map(|e| e.id()).collect();
        if !self.directed && u != v {
            connecting.extend(self.inner.edges_connecting(v, u).map(|e| e.id()));
        }
        connecting.sort();
        connecting
            .into_iter()
            .filter_map(|e| self.inner.edge_weight(e))
            .collect()
    }

    /// Every edge leaving `n`, as `(neighbor, attrs)`. Parallel edges are
    /// reported individually; undirected self-loops are reported once.
    pub fn adjacent(&self, n: NodeIndex) -> impl Iterator<Item = (NodeIndex, &EdgeAttrs)> + '_ {
        let outgoing = self
            .inner
            .edges_directed(n, Direction::Outgoing)
            .map(|e| (e.target(), e.weight()));
        let incoming = self
            .inner
            .edges_directed(n, Direction::Incoming)
            .filter(move |e| !self.directed && e.source() != n)
            .map(|e| (e.source(), e.weight()));
        outgoing.chain(incoming)
    }

    /// Number of edge endpoints at `n`; a self-loop counts twice.
    pub fn degree(&self, n: NodeIndex) -> usize {
        self.inner.edges_directed(n, Direction::Outgoing).count()
            + self.inner.edges_directed(n, Direction::Incoming).count()
    }

    /// Distinct successors (or neighbours, if undirected) of `n`.
    pub fn neighbors(&self, n: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = HashSet::new();
        self.adjacent(n)
            .map(|(m, _)| m)
            .filter(|m| seen.insert(*m))
            .collect()
    }

    /// Distinct neighbours of `n` with the edge cost given by `weight`.
    ///
    /// Parallel edges collapse to their cheapest cost; edges the weight
    /// function hides (returns `None`) are skipped.
    pub fn weighted_neighbors(&self, n: NodeIndex, weight: &WeightFn) -> Vec<(NodeIndex, f64)> {
        let mut order = Vec::new();
        let mut best: HashMap<NodeIndex, f64> = HashMap::new();
        for (m, attrs) in self.adjacent(n) {
            let Some(cost) = weight(n, m, attrs) else {
                continue;
            };
            match best.get_mut(&m) {
                Some(current) => {
                    if cost < *current {
                        *current = cost;
                    }
                }
                None => {
                    order.push(m);
                    best.insert(m, cost);
                }
            }
        }
        order.into_iter().map(|m| (m, best[&m])).collect()
    }

    /// Read-only view restricted to the nodes accepted by `keep`.
    pub fn filtered<F>(&self, keep: F) -> Filtered<'_, F>
    where
        F: Fn(NodeIndex) -> bool,
    {
        Filtered { graph: self, keep }
    }

    fn find_edge(&self, u: NodeIndex, v: NodeIndex) -> Option<EdgeIndex> {
        if self.directed {
            self.inner.find_edge(u, v)
        } else {
            self.inner.find_edge_undirected(u, v).map(|(e, _)| e)
        }
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match (self.multigraph, self.directed) {
            (false, false) => "Graph",
            (false, true) => "DiGraph",
            (true, false) => "MultiGraph",
            (true, true) => "MultiDiGraph",
        };
        write!(
            f,
            "{} with {} nodes and {} edges",
            kind,
            self.node_count(),
            self.edge_count()
        )
    }
}

/// Neighbourhood access shared by a full graph and its filtered views, so the
/// sequential algorithms can run on induced subgraphs without copying.
pub trait Adjacency {
    /// Upper bound (exclusive) on node index values
    fn node_bound(&self) -> usize;

    fn contains_node(&self, n: NodeIndex) -> bool;

    /// Included nodes in insertion order
    fn node_ids(&self) -> Vec<NodeIndex>;

    fn neighbor_ids(&self, n: NodeIndex) -> Vec<NodeIndex>;

    fn weighted_neighbor_ids(&self, n: NodeIndex, weight: &WeightFn) -> Vec<(NodeIndex, f64)>;

    fn is_directed(&self) -> bool;
}

impl Adjacency for Graph {
    fn node_bound(&self) -> usize {
        self.inner.node_count()
    }

    fn contains_node(&self, n: NodeIndex) -> bool {
        n.index() < self.inner.node_count()
    }

    fn node_ids(&self) -> Vec<NodeIndex> {
        self.node_indices().collect()
    }

    fn neighbor_ids(&self, n: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(n)
    }

    fn weighted_neighbor_ids(&self, n: NodeIndex, weight: &WeightFn) -> Vec<(NodeIndex, f64)> {
        self.weighted_neighbors(n, weight)
    }

    fn is_directed(&self) -> bool {
        self.directed
    }
}

/// Node-induced subgraph view, see [`Graph::filtered`].
pub struct Filtered<'a, F> {
    graph: &'a Graph,
    keep: F,
}

impl<F> Adjacency for Filtered<'_, F>
where
    F: Fn(NodeIndex) -> bool,
{
    fn node_bound(&self) -> usize {
        self.graph.node_bound()
    }

    fn contains_node(&self, n: NodeIndex) -> bool {
        self.graph.contains_node(n) && (self.keep)(n)
    }

    fn node_ids(&self) -> Vec<NodeIndex> {
        self.graph.node_indices().filter(|n| (self.keep)(*n)).collect()
    }

    fn neighbor_ids(&self, n: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors(n)
            .into_iter()
            .filter(|m| (self.keep)(*m))
            .collect()
    }

    fn weighted_neighbor_ids(&self, n: NodeIndex, weight: &WeightFn) -> Vec<(NodeIndex, f64)> {
        self.graph
            .weighted_neighbors(n, weight)
            .into_iter()
            .filter(|(m, _)| (self.keep)(*m))
            .collect()
    }

    fn is_directed(&self) -> bool {
        self.graph.directed
    }
}
