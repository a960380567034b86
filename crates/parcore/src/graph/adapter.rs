use super::Graph;
use std::fmt;
use std::sync::Arc;

/// Read-only capabilities the engine needs from any graph representation.
pub trait GraphView {
    fn is_directed(&self) -> bool;

    fn is_multigraph(&self) -> bool;

    fn node_count(&self) -> usize;

    /// Node labels in iteration order
    fn node_labels(&self) -> Vec<String>;
}

impl GraphView for Graph {
    fn is_directed(&self) -> bool {
        Graph::is_directed(self)
    }

    fn is_multigraph(&self) -> bool {
        Graph::is_multigraph(self)
    }

    fn node_count(&self) -> usize {
        Graph::node_count(self)
    }

    fn node_labels(&self) -> Vec<String> {
        self.labels().map(str::to_string).collect()
    }
}

/// Parallel-capable handle over a shared host graph.
///
/// The handle never mutates the graph; [`ParallelGraph::into_inner`] hands
/// the concrete graph back to sequential code.
#[derive(Debug, Clone, Default)]
pub struct ParallelGraph {
    graph: Arc<Graph>,
}

impl ParallelGraph {
    pub fn new(graph: impl Into<Arc<Graph>>) -> Self {
        Self {
            graph: graph.into(),
        }
    }

    pub fn is_directed(&self) -> bool {
        self.graph.is_directed()
    }

    pub fn is_multigraph(&self) -> bool {
        self.graph.is_multigraph()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.labels()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_inner(self) -> Arc<Graph> {
        self.graph
    }
}

impl GraphView for ParallelGraph {
    fn is_directed(&self) -> bool {
        ParallelGraph::is_directed(self)
    }

    fn is_multigraph(&self) -> bool {
        ParallelGraph::is_multigraph(self)
    }

    fn node_count(&self) -> usize {
        ParallelGraph::node_count(self)
    }

    fn node_labels(&self) -> Vec<String> {
        self.graph.node_labels()
    }
}

impl fmt::Display for ParallelGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parallel{}", self.graph)
    }
}

impl From<Graph> for ParallelGraph {
    fn from(graph: Graph) -> Self {
        Self::new(graph)
    }
}

impl From<Arc<Graph>> for ParallelGraph {
    fn from(graph: Arc<Graph>) -> Self {
        Self::new(graph)
    }
}

/// Graph argument accepted by every parallel entry point: either a plain
/// host graph or an already wrapped [`ParallelGraph`].
#[derive(Debug, Clone)]
pub enum GraphArg {
    Plain(Arc<Graph>),
    Parallel(ParallelGraph),
}

impl GraphArg {
    /// The concrete graph behind either representation.
    pub fn into_concrete(self) -> Arc<Graph> {
        match self {
            GraphArg::Plain(graph) => graph,
            GraphArg::Parallel(wrapped) => wrapped.into_inner(),
        }
    }

    pub fn concrete(&self) -> &Graph {
        match self {
            GraphArg::Plain(graph) => graph.as_ref(),
            GraphArg::Parallel(wrapped) => wrapped.graph(),
        }
    }
}

impl From<Graph> for GraphArg {
    fn from(graph: Graph) -> Self {
        GraphArg::Plain(Arc::new(graph))
    }
}

impl From<&Graph> for GraphArg {
    fn from(graph: &Graph) -> Self {
        GraphArg::Plain(Arc::new(graph.clone()))
    }
}

impl From<Arc<Graph>> for GraphArg {
    fn from(graph: Arc<Graph>) -> Self {
        GraphArg::Plain(graph)
    }
}

impl From<&Arc<Graph>> for GraphArg {
    fn from(graph: &Arc<Graph>) -> Self {
        GraphArg::Plain(Arc::clone(graph))
    }
}

impl From<ParallelGraph> for GraphArg {
    fn from(graph: ParallelGraph) -> Self {
        GraphArg::Parallel(graph)
    }
}

impl From<&ParallelGraph> for GraphArg {
    fn from(graph: &ParallelGraph) -> Self {
        GraphArg::Parallel(graph.clone())
    }
}

/// Upgrade any graph argument to the parallel handle. Already wrapped
/// graphs are returned as-is.
pub fn convert_from(graph: impl Into<GraphArg>) -> ParallelGraph {
    match graph.into() {
        GraphArg::Plain(graph) => ParallelGraph::new(graph),
        GraphArg::Parallel(wrapped) => wrapped,
    }
}

/// Hand the concrete graph back from a parallel handle.
pub fn convert_to(graph: ParallelGraph) -> Arc<Graph> {
    graph.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> Graph {
        let mut g = Graph::directed();
        g.add_weighted_edge("a", "b", 1.0);
        g.add_weighted_edge("b", "c", 1.0);
        g
    }

    #[test]
    fn wrapper_reports_host_capabilities() {
        let wrapped = ParallelGraph::new(path_graph());
        assert!(wrapped.is_directed());
        assert!(!wrapped.is_multigraph());
        assert_eq!(wrapped.nodes().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(wrapped.to_string(), "ParallelDiGraph with 3 nodes and 2 edges");
    }

    #[test]
    fn default_wrapper_is_empty_undirected() {
        let wrapped = ParallelGraph::default();
        assert_eq!(wrapped.node_count(), 0);
        assert!(!wrapped.is_directed());
    }

    #[test]
    fn conversion_round_trips_the_same_graph() {
        let shared = Arc::new(path_graph());
        let wrapped = convert_from(Arc::clone(&shared));
        let again = convert_from(&wrapped);
        let back = convert_to(again);
        assert!(Arc::ptr_eq(&shared, &back));
    }

    #[test]
    fn either_representation_unwraps_to_concrete() {
        let shared = Arc::new(path_graph());
        let plain = GraphArg::from(&shared).into_concrete();
        let wrapped = GraphArg::from(ParallelGraph::new(Arc::clone(&shared))).into_concrete();
        assert!(Arc::ptr_eq(&plain, &wrapped));
    }
}
