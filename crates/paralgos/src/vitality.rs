use crate::seq::structure::wiener_index;
use parcore::{AlgorithmError, ChunkingPolicy, EngineError, Graph, GraphArg, NodeIndex, Weight, WeightFn};
use parruntime::{chunk_units, item_units, Engine, UnitResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Wiener index of the whole graph, computed before any unit runs
pub struct VitalityContext {
    graph: Arc<Graph>,
    weight: Option<Arc<WeightFn>>,
    wiener: f64,
}

impl VitalityContext {
    fn new(graph: Arc<Graph>, weight: Option<&Weight>) -> Result<Self, AlgorithmError> {
        let weight = weight.map(|w| w.resolve(&graph));
        let wiener = wiener_index(graph.as_ref(), weight.as_deref())?;
        Ok(Self { graph, weight, wiener })
    }

    pub fn wiener_index(&self) -> f64 {
        self.wiener
    }
}

/// Wiener index lost when `v` is removed. Disconnected inputs give NaN.
pub fn process_vitality_item(ctx: &VitalityContext, v: NodeIndex) -> UnitResult<(String, f64)> {
    let without = ctx.graph.filtered(|n| n != v);
    let after = wiener_index(&without, ctx.weight.as_deref())?;
    Ok((ctx.graph.label(v).to_string(), ctx.wiener - after))
}

/// The default policy runs one unit per node; a custom policy groups nodes
/// into its chunks.
fn run_vitality(
    engine: &Engine,
    ctx: Arc<VitalityContext>,
    nodes: Vec<NodeIndex>,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<Vec<(String, f64)>, EngineError> {
    if policy.is_default() {
        return engine.eager("closeness_vitality", item_units(nodes, ctx, process_vitality_item));
    }
    let chunks = engine.split(nodes, policy)?;
    let units = chunk_units(chunks, ctx, |ctx, chunk| {
        chunk
            .into_iter()
            .map(|v| process_vitality_item(ctx, v))
            .collect::<UnitResult<Vec<_>>>()
    });
    Ok(engine
        .eager("closeness_vitality", units)?
        .into_iter()
        .flatten()
        .collect())
}

/// Closeness vitality of every node.
pub fn closeness_vitality(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    weight: Option<&Weight>,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<BTreeMap<String, f64>, EngineError> {
    let graph = graph.into().into_concrete();
    let nodes: Vec<NodeIndex> = graph.node_indices().collect();
    let ctx = engine.precompute("closeness_vitality.wiener_index", || {
        VitalityContext::new(graph, weight)
    })?;
    Ok(run_vitality(engine, ctx, nodes, policy)?.into_iter().collect())
}

/// Closeness vitality of a single node.
pub fn closeness_vitality_of(
    engine: &Engine,
    graph: impl Into<GraphArg>,
    node: &str,
    weight: Option<&Weight>,
    policy: &ChunkingPolicy<NodeIndex>,
) -> Result<f64, EngineError> {
    let graph = graph.into().into_concrete();
    let v = graph.require(node)?;
    let ctx = engine.precompute("closeness_vitality.wiener_index", || {
        VitalityContext::new(graph, weight)
    })?;
    let mut values = run_vitality(engine, ctx, vec![v], policy)?;
    Ok(values.pop().map_or(f64::NAN, |(_, value)| value))
}
