//! Registry entries for every parallel algorithm.

use crate::centrality::{self, BetweennessOptions};
use crate::{cluster, connectivity, efficiency, isolate, shortest_paths, vitality};
use parcore::{AlgorithmError, ChunkingPolicy, EngineError, GraphArg, Params, Value};
use parruntime::{
    AlgorithmEntry, AlgorithmMetadata, AlgorithmOutput, AlgorithmRegistry, Engine, ExecutionMode,
    ParamDefinition,
};
use std::sync::Arc;

type Invoke = fn(&Engine, GraphArg, &Params) -> Result<AlgorithmOutput, EngineError>;

/// Registry adapter over one entry-point function
#[derive(Clone, Copy)]
struct Builtin {
    name: &'static str,
    description: &'static str,
    family: &'static str,
    mode: ExecutionMode,
    parameters: &'static [(&'static str, &'static str)],
    invoke: Invoke,
}

impl AlgorithmEntry for Builtin {
    fn name(&self) -> &str {
        self.name
    }

    fn metadata(&self) -> AlgorithmMetadata {
        AlgorithmMetadata {
            description: self.description.to_string(),
            family: self.family.to_string(),
            mode: self.mode,
            parameters: self
                .parameters
                .iter()
                .map(|(name, description)| ParamDefinition::optional(name, description))
                .collect(),
        }
    }

    fn invoke(&self, engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
        (self.invoke)(engine, graph, params)
    }
}

fn invalid(err: AlgorithmError) -> EngineError {
    EngineError::InvalidArgument(err.to_string())
}

fn hop_cutoff(params: &Params) -> Result<Option<usize>, EngineError> {
    match params.f64_opt("cutoff").map_err(invalid)? {
        None => Ok(None),
        Some(c) if c >= 0.0 && c.fract() == 0.0 => Ok(Some(c as usize)),
        Some(c) => Err(EngineError::InvalidArgument(format!(
            "cutoff must be a non-negative integer, got {}",
            c
        ))),
    }
}

fn betweenness_options(params: &Params) -> Result<BetweennessOptions, EngineError> {
    if params.get("k").is_some_and(|k| !k.is_null()) {
        return Err(EngineError::InvalidArgument(
            "sampling sources with k is not supported".to_string(),
        ));
    }
    Ok(BetweennessOptions {
        weight: params.optional_weight().map_err(invalid)?,
        normalized: params.bool_or("normalized", true).map_err(invalid)?,
        endpoints: params.bool_or("endpoints", false).map_err(invalid)?,
    })
}

const WEIGHT: (&str, &str) = ("weight", "edge attribute holding the cost (default \"weight\")");
const CUTOFF: (&str, &str) = ("cutoff", "only report paths up to this length");
const OPTIONAL_WEIGHT: (&str, &str) = ("weight", "edge attribute holding the cost (unweighted if unset)");

fn all_pairs_dijkstra(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let weight = params.weight().map_err(invalid)?;
    let cutoff = params.f64_opt("cutoff").map_err(invalid)?;
    let items = shortest_paths::all_pairs_dijkstra(engine, graph, &weight, cutoff, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::keyed(items))
}

fn all_pairs_dijkstra_path_length(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let weight = params.weight().map_err(invalid)?;
    let cutoff = params.f64_opt("cutoff").map_err(invalid)?;
    let items =
        shortest_paths::all_pairs_dijkstra_path_length(engine, graph, &weight, cutoff, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::keyed(items))
}

fn all_pairs_dijkstra_path(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let weight = params.weight().map_err(invalid)?;
    let cutoff = params.f64_opt("cutoff").map_err(invalid)?;
    let items = shortest_paths::all_pairs_dijkstra_path(engine, graph, &weight, cutoff, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::keyed(items))
}

fn all_pairs_bellman_ford_path_length(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let weight = params.weight().map_err(invalid)?;
    let items = shortest_paths::all_pairs_bellman_ford_path_length(engine, graph, &weight, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::keyed(items))
}

fn all_pairs_bellman_ford_path(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let weight = params.weight().map_err(invalid)?;
    let items = shortest_paths::all_pairs_bellman_ford_path(engine, graph, &weight, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::keyed(items))
}

fn johnson(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let weight = params.weight().map_err(invalid)?;
    let paths = shortest_paths::johnson(engine, graph, &weight, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::Aggregate(paths.into()))
}

fn all_pairs_shortest_path_length(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let cutoff = hop_cutoff(params)?;
    let items = shortest_paths::all_pairs_shortest_path_length(engine, graph, cutoff, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::keyed(items))
}

fn all_pairs_shortest_path(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let cutoff = hop_cutoff(params)?;
    let items = shortest_paths::all_pairs_shortest_path(engine, graph, cutoff, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::keyed(items))
}

fn number_of_isolates(engine: &Engine, graph: GraphArg, _params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let count = isolate::number_of_isolates(engine, graph, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::Aggregate(count.into()))
}

fn betweenness_centrality(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let options = betweenness_options(params)?;
    let scores = centrality::betweenness_centrality(engine, graph, &options, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::Aggregate(scores.into()))
}

fn edge_betweenness_centrality(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let options = betweenness_options(params)?;
    let scores = centrality::edge_betweenness_centrality(engine, graph, &options, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::Aggregate(scores.into()))
}

fn closeness_vitality(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let weight = params.optional_weight().map_err(invalid)?;
    match params.str_opt("node").map_err(invalid)? {
        Some(node) => {
            let value = vitality::closeness_vitality_of(engine, graph, node, weight.as_ref(), &ChunkingPolicy::Default)?;
            Ok(AlgorithmOutput::Aggregate(value.into()))
        }
        None => {
            let scores = vitality::closeness_vitality(engine, graph, weight.as_ref(), &ChunkingPolicy::Default)?;
            Ok(AlgorithmOutput::Aggregate(scores.into()))
        }
    }
}

fn square_clustering(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let nodes = params.labels_opt("nodes").map_err(invalid)?;
    let scores = cluster::square_clustering(engine, graph, nodes.as_deref(), &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::Aggregate(scores.into()))
}

fn local_efficiency(engine: &Engine, graph: GraphArg, _params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let value = efficiency::local_efficiency(engine, graph, &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::Aggregate(value.into()))
}

fn all_pairs_node_connectivity(engine: &Engine, graph: GraphArg, params: &Params) -> Result<AlgorithmOutput, EngineError> {
    let nbunch = params.labels_opt("nbunch").map_err(invalid)?;
    let result =
        connectivity::all_pairs_node_connectivity(engine, graph, nbunch.as_deref(), &ChunkingPolicy::Default)?;
    Ok(AlgorithmOutput::Aggregate(Value::from(result)))
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "all_pairs_dijkstra",
        description: "Shortest distances and paths from every source (Dijkstra)",
        family: "shortest_paths",
        mode: ExecutionMode::Lazy,
        parameters: &[WEIGHT, CUTOFF],
        invoke: all_pairs_dijkstra,
    },
    Builtin {
        name: "all_pairs_dijkstra_path_length",
        description: "Shortest distances from every source (Dijkstra)",
        family: "shortest_paths",
        mode: ExecutionMode::Lazy,
        parameters: &[WEIGHT, CUTOFF],
        invoke: all_pairs_dijkstra_path_length,
    },
    Builtin {
        name: "all_pairs_dijkstra_path",
        description: "Shortest paths from every source (Dijkstra)",
        family: "shortest_paths",
        mode: ExecutionMode::Lazy,
        parameters: &[WEIGHT, CUTOFF],
        invoke: all_pairs_dijkstra_path,
    },
    Builtin {
        name: "all_pairs_bellman_ford_path_length",
        description: "Shortest distances from every source, negative weights allowed",
        family: "shortest_paths",
        mode: ExecutionMode::Lazy,
        parameters: &[WEIGHT],
        invoke: all_pairs_bellman_ford_path_length,
    },
    Builtin {
        name: "all_pairs_bellman_ford_path",
        description: "Shortest paths from every source, negative weights allowed",
        family: "shortest_paths",
        mode: ExecutionMode::Lazy,
        parameters: &[WEIGHT],
        invoke: all_pairs_bellman_ford_path,
    },
    Builtin {
        name: "johnson",
        description: "All-pairs shortest paths by Johnson reweighting",
        family: "shortest_paths",
        mode: ExecutionMode::Eager,
        parameters: &[WEIGHT],
        invoke: johnson,
    },
    Builtin {
        name: "all_pairs_shortest_path_length",
        description: "Hop counts from every source (BFS)",
        family: "shortest_paths",
        mode: ExecutionMode::Lazy,
        parameters: &[CUTOFF],
        invoke: all_pairs_shortest_path_length,
    },
    Builtin {
        name: "all_pairs_shortest_path",
        description: "Fewest-hop paths from every source (BFS)",
        family: "shortest_paths",
        mode: ExecutionMode::Lazy,
        parameters: &[CUTOFF],
        invoke: all_pairs_shortest_path,
    },
    Builtin {
        name: "number_of_isolates",
        description: "Count of nodes without incident edges",
        family: "isolate",
        mode: ExecutionMode::Eager,
        parameters: &[],
        invoke: number_of_isolates,
    },
    Builtin {
        name: "betweenness_centrality",
        description: "Shortest-path betweenness of every node",
        family: "centrality",
        mode: ExecutionMode::Eager,
        parameters: &[
            OPTIONAL_WEIGHT,
            ("normalized", "scale by the number of node pairs (default true)"),
            ("endpoints", "include path endpoints (default false)"),
        ],
        invoke: betweenness_centrality,
    },
    Builtin {
        name: "edge_betweenness_centrality",
        description: "Shortest-path betweenness of every edge",
        family: "centrality",
        mode: ExecutionMode::Eager,
        parameters: &[
            OPTIONAL_WEIGHT,
            ("normalized", "scale by the number of node pairs (default true)"),
        ],
        invoke: edge_betweenness_centrality,
    },
    Builtin {
        name: "closeness_vitality",
        description: "Wiener index lost by removing each node",
        family: "vitality",
        mode: ExecutionMode::Eager,
        parameters: &[OPTIONAL_WEIGHT, ("node", "only compute for this node")],
        invoke: closeness_vitality,
    },
    Builtin {
        name: "square_clustering",
        description: "Square clustering coefficient of every node",
        family: "cluster",
        mode: ExecutionMode::Eager,
        parameters: &[("nodes", "restrict to these nodes")],
        invoke: square_clustering,
    },
    Builtin {
        name: "local_efficiency",
        description: "Average efficiency of node neighbourhoods",
        family: "efficiency",
        mode: ExecutionMode::Eager,
        parameters: &[],
        invoke: local_efficiency,
    },
    Builtin {
        name: "connectivity.all_pairs_node_connectivity",
        description: "Local node connectivity between all node pairs",
        family: "connectivity",
        mode: ExecutionMode::Eager,
        parameters: &[("nbunch", "restrict to pairs among these nodes")],
        invoke: all_pairs_node_connectivity,
    },
];

/// Register every parallel algorithm with a registry
pub fn register_all(registry: &mut AlgorithmRegistry) {
    for builtin in BUILTINS {
        registry.register(Arc::new(*builtin));
    }
}

/// Registry pre-populated with [`register_all`].
pub fn default_registry() -> AlgorithmRegistry {
    let mut registry = AlgorithmRegistry::new();
    register_all(&mut registry);
    registry
}
