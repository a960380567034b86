use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Algorithm not found: {0}")]
    NotFound(String),

    #[error("Work unit {index} failed: {source}")]
    WorkerFailure {
        index: usize,
        #[source]
        source: AlgorithmError,
    },

    #[error("Precompute stage '{stage}' failed: {source}")]
    PartialPrecomputeFailure {
        stage: String,
        #[source]
        source: AlgorithmError,
    },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

impl EngineError {
    /// The failure raised inside a unit or precompute stage, if any.
    pub fn algorithm_error(&self) -> Option<&AlgorithmError> {
        match self {
            EngineError::WorkerFailure { source, .. }
            | EngineError::PartialPrecomputeFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure of one sequential computation, raised from inside a work unit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgorithmError {
    #[error("Negative cost cycle detected")]
    NegativeCycle,

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Computation failed: {0}")]
    Failed(String),

    #[error("Work unit panicked: {0}")]
    Panicked(String),
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown node: {0}")]
    UnknownNode(String),
}
