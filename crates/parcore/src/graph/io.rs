use super::{EdgeAttrs, Graph};
use crate::GraphError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialisable node-link form of a [`Graph`]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphData {
    #[serde(default)]
    pub directed: bool,
    #[serde(default)]
    pub multigraph: bool,
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(default)]
    pub edges: Vec<EdgeData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeData {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub attrs: EdgeAttrs,
}

impl From<GraphData> for Graph {
    fn from(data: GraphData) -> Self {
        let mut graph = Graph::with_kind(data.directed, data.multigraph);
        for node in data.nodes {
            graph.add_node(node);
        }
        for edge in data.edges {
            graph.add_edge(edge.source, edge.target, edge.attrs);
        }
        graph
    }
}

impl From<&Graph> for GraphData {
    fn from(graph: &Graph) -> Self {
        GraphData {
            directed: graph.is_directed(),
            multigraph: graph.is_multigraph(),
            nodes: graph.labels().map(str::to_string).collect(),
            edges: graph
                .edges()
                .map(|(u, v, attrs)| EdgeData {
                    source: graph.label(u).to_string(),
                    target: graph.label(v).to_string(),
                    attrs: attrs.clone(),
                })
                .collect(),
        }
    }
}

impl Graph {
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        let data: GraphData = serde_json::from_str(json)?;
        Ok(data.into())
    }

    pub fn to_json_string(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(&GraphData::from(self))?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let graph = Self::from_json_str(&json)?;
        tracing::debug!(
            "Loaded {} from {}",
            graph,
            path.as_ref().display()
        );
        Ok(graph)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GraphError> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}
