use super::{EdgeAttrs, Graph, NodeIndex};
use std::fmt;
use std::sync::Arc;

/// Resolved edge cost function over node indices. `None` hides the edge.
pub type WeightFn = dyn Fn(NodeIndex, NodeIndex, &EdgeAttrs) -> Option<f64> + Send + Sync;

type LabelWeightFn = dyn Fn(&str, &str, &EdgeAttrs) -> Option<f64> + Send + Sync;

/// How an algorithm reads the cost of an edge.
#[derive(Clone)]
pub enum Weight {
    /// Named attribute; edges without it cost 1.0
    Attribute(String),
    /// Caller-supplied function of `(source, target, attrs)`
    Func(Arc<LabelWeightFn>),
}

impl Weight {
    pub fn attribute(name: impl Into<String>) -> Self {
        Weight::Attribute(name.into())
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&str, &str, &EdgeAttrs) -> Option<f64> + Send + Sync + 'static,
    {
        Weight::Func(Arc::new(f))
    }

    /// Bind this weight to `graph`, producing an index-based cost function
    /// that work units can share.
    pub fn resolve(&self, graph: &Arc<Graph>) -> Arc<WeightFn> {
        match self {
            Weight::Attribute(name) => {
                let name = name.clone();
                Arc::new(move |_: NodeIndex, _: NodeIndex, attrs: &EdgeAttrs| {
                    Some(attrs.get(&name).copied().unwrap_or(1.0))
                })
            }
            Weight::Func(f) => {
                let f = Arc::clone(f);
                let graph = Arc::clone(graph);
                Arc::new(move |u: NodeIndex, v: NodeIndex, attrs: &EdgeAttrs| {
                    f(graph.label(u), graph.label(v), attrs)
                })
            }
        }
    }
}

impl Default for Weight {
    fn default() -> Self {
        Weight::Attribute("weight".to_string())
    }
}

impl fmt::Debug for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            Weight::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl From<&str> for Weight {
    fn from(name: &str) -> Self {
        Weight::attribute(name)
    }
}
